//! # Cinegraph Graph
//!
//! Neo4j integration for the film dataset: a typed graph store boundary,
//! an idempotent reconciliation layer that mirrors relational facts as
//! Person/Movie nodes and typed relationships, and schema bootstrap.

pub mod client;
pub mod error;
pub mod memory;
pub mod neo4j;
pub mod reconcile;
pub mod schema;
pub mod store;

pub use client::{GraphClient, GraphConfig, GraphCounts};
pub use error::{GraphError, GraphResult};
pub use memory::MemoryStore;
pub use neo4j::Neo4jStore;
pub use reconcile::{
    facts_from_rows, relationship_type, BatchReport, CastFact, FactFailure, MovieKey,
    MovieSummary, PersonKey, Reconciler,
};
pub use store::{GraphEdge, GraphNode, GraphStore, NodeKey, Properties};
