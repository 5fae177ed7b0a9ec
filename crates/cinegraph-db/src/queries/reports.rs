//! Thin single-query report lookups.
//!
//! These are the fixed-parameter queries surrounding the analytics core:
//! no aggregation logic lives here beyond what one SQL statement expresses.

use rusqlite::params;
use serde::Serialize;

use crate::pool::{DbError, DbPool, DbResult};

/// An artist with their birth year.
#[derive(Debug, Clone, Serialize)]
pub struct ArtistBirthYear {
    pub name: String,
    pub birth_year: Option<i32>,
}

/// A film with its distinct actor count.
#[derive(Debug, Clone, Serialize)]
pub struct FilmActorCount {
    pub id: String,
    pub title: String,
    pub actor_count: i64,
}

/// An artist with the number of films they acted in.
#[derive(Debug, Clone, Serialize)]
pub struct ArtistFilmCount {
    pub name: String,
    pub film_count: i64,
}

/// A role with the number of distinct artists who held it.
#[derive(Debug, Clone, Serialize)]
pub struct RoleArtistCount {
    pub role: String,
    pub artist_count: i64,
}

/// Look up one artist's birth year by exact name.
pub fn artist_birth_year(pool: &DbPool, name: &str) -> DbResult<Option<ArtistBirthYear>> {
    pool.with_conn(|conn| {
        conn.query_row(
            "SELECT name, birth_year FROM artists WHERE name = ?1",
            params![name],
            |row| {
                Ok(ArtistBirthYear {
                    name: row.get(0)?,
                    birth_year: row.get(1)?,
                })
            },
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            e => Err(DbError::Connection(e)),
        })
    })
}

/// Total number of artists.
pub fn count_artists(pool: &DbPool) -> DbResult<i64> {
    pool.with_conn(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM artists", [], |row| row.get(0))?)
    })
}

/// Names of artists born in a given year.
pub fn artists_born_in(pool: &DbPool, year: i32) -> DbResult<Vec<String>> {
    pool.with_conn(|conn| {
        let mut stmt =
            conn.prepare("SELECT name FROM artists WHERE birth_year = ?1 ORDER BY name")?;
        let rows = stmt.query_map(params![year], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    })
}

/// Artists who acted in more than one film, most prolific first.
pub fn artists_with_multiple_films(pool: &DbPool) -> DbResult<Vec<ArtistFilmCount>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT a.name, COUNT(DISTINCT j.film_id) AS film_count
             FROM artists a
             JOIN jobs j ON j.artist_id = a.id
             WHERE j.category = 'acted in'
             GROUP BY a.id, a.name
             HAVING COUNT(DISTINCT j.film_id) > 1
             ORDER BY film_count DESC, a.name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ArtistFilmCount {
                name: row.get(0)?,
                film_count: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    })
}

/// Distinct artists per role, largest role first.
pub fn artists_per_role(pool: &DbPool) -> DbResult<Vec<RoleArtistCount>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT j.category, COUNT(DISTINCT j.artist_id) AS artist_count
             FROM jobs j
             WHERE j.category IS NOT NULL
             GROUP BY j.category
             ORDER BY artist_count DESC, j.category",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(RoleArtistCount {
                role: row.get(0)?,
                artist_count: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    })
}

/// All films with their distinct actor count, most cast-heavy first.
pub fn films_with_actor_count(pool: &DbPool) -> DbResult<Vec<FilmActorCount>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT f.id, f.title, COUNT(DISTINCT j.artist_id) AS actor_count
             FROM films f
             JOIN jobs j ON j.film_id = f.id
             WHERE j.category = 'acted in'
             GROUP BY f.id, f.title
             ORDER BY actor_count DESC, f.title",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(FilmActorCount {
                id: row.get(0)?,
                title: row.get(1)?,
                actor_count: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    })
}
