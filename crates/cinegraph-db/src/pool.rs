//! Database pool.
//!
//! An explicit handle around one SQLite connection, passed into adapters
//! at construction. Callers own the lifecycle; there is no process-wide
//! cached connection.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use thiserror::Error;

/// Database error types.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Connection(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Connection handle poisoned")]
    Poisoned,
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Shared handle over a single SQLite connection.
///
/// Clones share the same underlying connection; access is serialized
/// through a mutex, which is enough for the single-threaded synchronous
/// read path this layer serves.
#[derive(Clone)]
pub struct DbPool {
    conn: Arc<Mutex<Connection>>,
}

impl DbPool {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (tests and scratch runs).
    pub fn in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure with shared access to the connection.
    pub fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> DbResult<T>) -> DbResult<T> {
        let conn = self.conn.lock().map_err(|_| DbError::Poisoned)?;
        f(&conn)
    }

    /// Run a closure with exclusive access (migrations need `&mut`).
    pub fn with_conn_mut<T>(&self, f: impl FnOnce(&mut Connection) -> DbResult<T>) -> DbResult<T> {
        let mut conn = self.conn.lock().map_err(|_| DbError::Poisoned)?;
        f(&mut conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_one_connection() {
        let pool = DbPool::in_memory().unwrap();
        let other = pool.clone();

        pool.with_conn(|conn| {
            conn.execute("CREATE TABLE t (x INTEGER)", [])?;
            conn.execute("INSERT INTO t (x) VALUES (7)", [])?;
            Ok(())
        })
        .unwrap();

        let x: i64 = other
            .with_conn(|conn| Ok(conn.query_row("SELECT x FROM t", [], |row| row.get(0))?))
            .unwrap();
        assert_eq!(x, 7);
    }
}
