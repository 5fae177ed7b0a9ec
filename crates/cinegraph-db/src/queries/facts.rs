//! Fact source adapter.
//!
//! Parameterized read queries yielding typed [`FactRow`]s for the
//! analytics engine. Rows failing boundary validation are logged and
//! excluded; aggregation downstream continues.

use cinegraph_core::FactRow;
use rusqlite::Connection;
use tracing::warn;

use crate::pool::{DbPool, DbResult};

/// Collect mapped rows, excluding the ones that fail validation.
fn collect_valid(
    rows: impl Iterator<Item = rusqlite::Result<FactRow>>,
) -> rusqlite::Result<Vec<FactRow>> {
    let mut facts = Vec::new();
    for row in rows {
        let fact = row?;
        match fact.validate() {
            Ok(()) => facts.push(fact),
            Err(err) => warn!(%err, "Dropping fact row at adapter boundary"),
        }
    }
    Ok(facts)
}

fn fetch_job_facts(conn: &Connection, sql: &str) -> rusqlite::Result<Vec<FactRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| {
        Ok(FactRow::new(
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, Option<i32>>(5)?,
        ))
    })?;
    collect_valid(rows)
}

/// All role assignments: one row per (artist, film, category).
///
/// The ORDER BY is cosmetic; the engine's ordering contract does not
/// depend on input order.
pub fn fetch_role_facts(pool: &DbPool) -> DbResult<Vec<FactRow>> {
    pool.with_conn(|conn| {
        Ok(fetch_job_facts(
            conn,
            "SELECT j.artist_id, a.name, j.film_id, f.title, j.category, f.start_year
             FROM jobs j
             JOIN artists a ON a.id = j.artist_id
             JOIN films f ON f.id = j.film_id
             WHERE j.category IS NOT NULL
             ORDER BY a.name, f.title, j.category",
        )?)
    })
}

/// Acting assignments only, for the "film with most actors" ranking.
pub fn fetch_actor_film_facts(pool: &DbPool) -> DbResult<Vec<FactRow>> {
    pool.with_conn(|conn| {
        Ok(fetch_job_facts(
            conn,
            "SELECT j.artist_id, a.name, j.film_id, f.title, j.category, f.start_year
             FROM jobs j
             JOIN artists a ON a.id = j.artist_id
             JOIN films f ON f.id = j.film_id
             WHERE j.category = 'acted in'
             ORDER BY f.title, a.name",
        )?)
    })
}

/// One row per artist with a usable birth year (`year` carries it).
///
/// The dataset uses 0 as a birth-year placeholder; those rows are
/// excluded along with NULLs.
pub fn fetch_birth_year_facts(pool: &DbPool) -> DbResult<Vec<FactRow>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id, name, birth_year
             FROM artists
             WHERE birth_year IS NOT NULL AND birth_year <> 0",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(FactRow::new(
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                "",
                "",
                None,
                row.get::<_, Option<i32>>(2)?,
            ))
        })?;
        Ok(collect_valid(rows)?)
    })
}
