//! Shared test fixtures: a migrated in-memory database with a small,
//! hand-checkable film dataset.

use rusqlite::params;

use crate::migrations::run_migrations;
use crate::pool::DbPool;

pub(crate) fn seeded_pool() -> DbPool {
    let pool = DbPool::in_memory().unwrap();
    run_migrations(&pool).unwrap();

    pool.with_conn(|conn| {
        let artists: &[(&str, &str, Option<i32>)] = &[
            ("a1", "Ann Blake", Some(1960)),
            ("a2", "Bob Stone", Some(1960)),
            ("a3", "Cleo Fox", Some(1971)),
            ("a4", "Dan Marsh", Some(1960)),
            ("a5", "Zora Null", Some(0)),
        ];
        for (id, name, birth_year) in artists {
            conn.execute(
                "INSERT INTO artists (id, name, birth_year) VALUES (?1, ?2, ?3)",
                params![id, name, birth_year],
            )?;
        }

        let films: &[(&str, &str, i32)] = &[
            ("f1", "Double Duty", 1999),
            ("f2", "Ensemble", 2004),
            ("f3", "Solo", 2010),
        ];
        for (id, title, year) in films {
            conn.execute(
                "INSERT INTO films (id, title, start_year) VALUES (?1, ?2, ?3)",
                params![id, title, year],
            )?;
        }

        let jobs: &[(&str, &str, Option<&str>)] = &[
            ("a1", "f1", Some("acted in")),
            ("a1", "f1", Some("directed")),
            ("a2", "f1", Some("acted in")),
            ("a2", "f2", Some("acted in")),
            ("a2", "f2", Some("directed")),
            ("a3", "f2", Some("acted in")),
            ("a4", "f2", Some("acted in")),
            ("a3", "f3", Some("acted in")),
            ("a5", "f1", None),
        ];
        for (artist_id, film_id, category) in jobs {
            conn.execute(
                "INSERT INTO jobs (artist_id, film_id, category) VALUES (?1, ?2, ?3)",
                params![artist_id, film_id, category],
            )?;
        }

        Ok(())
    })
    .unwrap();

    pool
}
