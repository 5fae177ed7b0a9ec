//! Centralized error types for the analytics engine.

use thiserror::Error;

/// Errors raised while turning fact rows into aggregates.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Malformed fact row: missing {field} (entity name: {entity_name:?})")]
    MalformedFactRow {
        field: &'static str,
        entity_name: String,
    },

    #[error("Top-{n} is ambiguous: {candidates} groups share the boundary count {count}")]
    AmbiguousTieBreak {
        n: usize,
        count: usize,
        candidates: usize,
    },
}

/// Result type for analytics operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

impl AnalyticsError {
    /// Create a malformed-row error for a missing required field.
    pub fn malformed(field: &'static str, entity_name: impl Into<String>) -> Self {
        Self::MalformedFactRow {
            field,
            entity_name: entity_name.into(),
        }
    }
}
