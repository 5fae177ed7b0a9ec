//! Typed graph store boundary.
//!
//! The reconciliation layer talks to this trait instead of raw Cypher, so
//! the same contract holds against Neo4j and against the in-memory store
//! used by tests. Node identity is the natural key (label + key
//! properties), never a generated surrogate id.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::GraphResult;

/// Property map for nodes; all values are strings in this graph.
pub type Properties = BTreeMap<String, String>;

/// Natural key of a node: label plus identifying properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeKey {
    pub label: String,
    pub properties: Properties,
}

impl NodeKey {
    pub fn new<I, K, V>(label: impl Into<String>, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            label: label.into(),
            properties: properties
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Whether a node with these properties matches this key.
    pub fn matches(&self, label: &str, properties: &Properties) -> bool {
        self.label == label
            && self
                .properties
                .iter()
                .all(|(k, v)| properties.get(k) == Some(v))
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let props: Vec<String> = self
            .properties
            .iter()
            .map(|(k, v)| format!("{k}: {v:?}"))
            .collect();
        write!(f, "{}{{{}}}", self.label, props.join(", "))
    }
}

/// A node record with at least its natural-key properties populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub label: String,
    pub properties: Properties,
}

/// A directed, typed edge between two nodes identified by natural key.
///
/// Endpoint keys carry the full property map of the node as stored, so
/// consumers can read display properties without another round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub rel_type: String,
    pub from: NodeKey,
    pub to: NodeKey,
}

/// Operations the reconciliation layer depends on.
///
/// `create_node` is the deliberate non-idempotent escape hatch: calling it
/// twice with the same natural key produces duplicate nodes. Everything
/// meant to be deduplicated goes through `merge_node` / `merge_edge`.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Unconditionally create a node. May produce duplicates.
    async fn create_node(&self, label: &str, properties: Properties) -> GraphResult<GraphNode>;

    /// Create the node if absent, otherwise return the existing one;
    /// `extra` properties are applied either way. The only idempotent
    /// node operation.
    async fn merge_node(&self, key: &NodeKey, extra: Properties) -> GraphResult<GraphNode>;

    /// Idempotently create the edge between two existing nodes. Fails if
    /// either endpoint is missing rather than silently matching nothing.
    async fn merge_edge(
        &self,
        rel_type: &str,
        from: &NodeKey,
        to: &NodeKey,
    ) -> GraphResult<GraphEdge>;

    /// Read-only: all nodes matching a natural key (more than one only
    /// when `create_node` was used).
    async fn match_nodes(&self, key: &NodeKey) -> GraphResult<Vec<GraphNode>>;

    /// Read-only pattern match over edges; each filter is optional.
    async fn match_edges(
        &self,
        rel_type: Option<&str>,
        from: Option<&NodeKey>,
        to: Option<&NodeKey>,
    ) -> GraphResult<Vec<GraphEdge>>;
}
