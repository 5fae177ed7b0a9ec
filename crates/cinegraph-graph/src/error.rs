//! Graph layer error types.

use thiserror::Error;

/// Errors surfaced by graph store operations.
///
/// Every adapter failure carries the attempted operation and the target
/// keys, so callers can log or retry a specific fact.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Graph operation '{operation}' failed for {target}: {source}")]
    OperationFailed {
        operation: &'static str,
        target: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid graph identifier {0:?}: labels, relationship types and property names must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidIdentifier(String),
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

impl GraphError {
    /// Wrap an underlying failure with the operation and target keys.
    pub fn operation(
        operation: &'static str,
        target: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::OperationFailed {
            operation,
            target: target.into(),
            source: source.into(),
        }
    }
}
