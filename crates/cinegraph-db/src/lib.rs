//! Cinegraph Database Layer.
//!
//! Read-mostly SQLite adapter over the normalized film dataset
//! (artists, films, job assignments). Yields typed fact rows for the
//! analytics engine and a handful of thin report queries; never mutates
//! data outside of schema bootstrap.

pub mod migrations;
pub mod pool;
pub mod queries;

pub use pool::{DbError, DbPool, DbResult};
pub use migrations::run_migrations;

#[cfg(test)]
pub(crate) mod test_support;
