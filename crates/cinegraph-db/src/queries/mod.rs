//! Database query modules.

pub mod facts;
pub mod reports;
