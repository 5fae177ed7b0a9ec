//! In-memory graph store.
//!
//! Honors the same contract as the Neo4j store, including the
//! create-vs-merge distinction, so reconciliation logic can be exercised
//! without a live database. Used by the test suite and offline runs.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{GraphError, GraphResult};
use crate::store::{GraphEdge, GraphNode, GraphStore, NodeKey, Properties};

/// Edge stored by node index, not by property snapshot. Nodes are never
/// removed, so indices stay valid, and endpoint properties are resolved
/// live when edges are read back. Merging the same endpoints and type
/// again stays a no-op even after `merge_node` updated a property.
#[derive(Debug, PartialEq, Eq)]
struct StoredEdge {
    rel_type: String,
    from: usize,
    to: usize,
}

#[derive(Debug, Default)]
struct State {
    nodes: Vec<GraphNode>,
    edges: Vec<StoredEdge>,
}

impl State {
    fn materialize(&self, edge: &StoredEdge) -> GraphEdge {
        GraphEdge {
            rel_type: edge.rel_type.clone(),
            from: endpoint(&self.nodes[edge.from]),
            to: endpoint(&self.nodes[edge.to]),
        }
    }
}

/// Process-local graph state behind the [`GraphStore`] trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self, operation: &'static str) -> GraphResult<MutexGuard<'_, State>> {
        self.state.lock().map_err(|_| {
            GraphError::operation(operation, "memory store", anyhow::anyhow!("state poisoned"))
        })
    }

    /// Total node count, across all labels.
    pub fn node_count(&self) -> usize {
        self.state.lock().map(|s| s.nodes.len()).unwrap_or(0)
    }

    /// Total edge count.
    pub fn edge_count(&self) -> usize {
        self.state.lock().map(|s| s.edges.len()).unwrap_or(0)
    }
}

/// Full-property key of a stored node, used as an edge endpoint.
fn endpoint(node: &GraphNode) -> NodeKey {
    NodeKey {
        label: node.label.clone(),
        properties: node.properties.clone(),
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn create_node(&self, label: &str, properties: Properties) -> GraphResult<GraphNode> {
        let node = GraphNode {
            label: label.to_string(),
            properties,
        };
        // Unconditional: duplicates are the caller's explicit choice.
        self.lock("create_node")?.nodes.push(node.clone());
        Ok(node)
    }

    async fn merge_node(&self, key: &NodeKey, extra: Properties) -> GraphResult<GraphNode> {
        let mut state = self.lock("merge_node")?;

        if let Some(node) = state
            .nodes
            .iter_mut()
            .find(|n| key.matches(&n.label, &n.properties))
        {
            node.properties.extend(extra);
            return Ok(node.clone());
        }

        let mut properties = key.properties.clone();
        properties.extend(extra);
        let node = GraphNode {
            label: key.label.clone(),
            properties,
        };
        state.nodes.push(node.clone());
        Ok(node)
    }

    async fn merge_edge(
        &self,
        rel_type: &str,
        from: &NodeKey,
        to: &NodeKey,
    ) -> GraphResult<GraphEdge> {
        let mut state = self.lock("merge_edge")?;

        let resolve = |state: &State, key: &NodeKey| -> Option<usize> {
            state
                .nodes
                .iter()
                .position(|n| key.matches(&n.label, &n.properties))
        };

        let target = format!("{from}-[{rel_type}]->{to}");
        let from_idx = resolve(&state, from).ok_or_else(|| {
            GraphError::operation(
                "merge_edge",
                &target,
                anyhow::anyhow!("from endpoint does not exist"),
            )
        })?;
        let to_idx = resolve(&state, to).ok_or_else(|| {
            GraphError::operation(
                "merge_edge",
                &target,
                anyhow::anyhow!("to endpoint does not exist"),
            )
        })?;

        let stored = StoredEdge {
            rel_type: rel_type.to_string(),
            from: from_idx,
            to: to_idx,
        };
        let edge = state.materialize(&stored);
        if !state.edges.contains(&stored) {
            state.edges.push(stored);
        }
        Ok(edge)
    }

    async fn match_nodes(&self, key: &NodeKey) -> GraphResult<Vec<GraphNode>> {
        let state = self.lock("match_nodes")?;
        Ok(state
            .nodes
            .iter()
            .filter(|n| key.matches(&n.label, &n.properties))
            .cloned()
            .collect())
    }

    async fn match_edges(
        &self,
        rel_type: Option<&str>,
        from: Option<&NodeKey>,
        to: Option<&NodeKey>,
    ) -> GraphResult<Vec<GraphEdge>> {
        let state = self.lock("match_edges")?;
        Ok(state
            .edges
            .iter()
            .map(|e| state.materialize(e))
            .filter(|e| rel_type.is_none_or(|r| e.rel_type == r))
            .filter(|e| from.is_none_or(|k| k.matches(&e.from.label, &e.from.properties)))
            .filter(|e| to.is_none_or(|k| k.matches(&e.to.label, &e.to.properties)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie_key(title: &str) -> NodeKey {
        NodeKey::new("Movie", [("title", title)])
    }

    #[tokio::test]
    async fn test_create_node_allows_duplicates() {
        let store = MemoryStore::new();
        let props = movie_key("X").properties;

        store.create_node("Movie", props.clone()).await.unwrap();
        store.create_node("Movie", props).await.unwrap();

        let matches = store.match_nodes(&movie_key("X")).await.unwrap();
        assert_eq!(matches.len(), 2);
    }

    #[tokio::test]
    async fn test_merge_node_is_idempotent_and_updates() {
        let store = MemoryStore::new();
        let key = NodeKey::new("Person", [("firstName", "Ann"), ("lastName", "Blake")]);

        let extra: Properties = [("name".to_string(), "Ann Blake".to_string())].into();
        store.merge_node(&key, extra).await.unwrap();

        let extra: Properties = [("name".to_string(), "Ann B. Blake".to_string())].into();
        let node = store.merge_node(&key, extra).await.unwrap();

        assert_eq!(store.node_count(), 1);
        assert_eq!(node.properties.get("name").unwrap(), "Ann B. Blake");
    }

    #[tokio::test]
    async fn test_merge_edge_requires_endpoints() {
        let store = MemoryStore::new();
        let person = NodeKey::new("Person", [("firstName", "Ann"), ("lastName", "Blake")]);
        let movie = movie_key("X");

        let err = store.merge_edge("ACTED_IN", &person, &movie).await.unwrap_err();
        assert!(matches!(
            err,
            GraphError::OperationFailed { operation: "merge_edge", .. }
        ));

        store.merge_node(&person, Properties::new()).await.unwrap();
        store.merge_node(&movie, Properties::new()).await.unwrap();
        store.merge_edge("ACTED_IN", &person, &movie).await.unwrap();
        store.merge_edge("ACTED_IN", &person, &movie).await.unwrap();
        assert_eq!(store.edge_count(), 1);
    }

    #[tokio::test]
    async fn test_merge_edge_idempotent_across_node_updates() {
        let store = MemoryStore::new();
        let person = NodeKey::new("Person", [("firstName", "Ann"), ("lastName", "Blake")]);
        let movie = movie_key("X");

        store.merge_node(&person, Properties::new()).await.unwrap();
        store.merge_node(&movie, Properties::new()).await.unwrap();
        store.merge_edge("ACTED_IN", &person, &movie).await.unwrap();

        // A non-key property update must not change edge identity.
        let extra: Properties = [("name".to_string(), "Ann Blake".to_string())].into();
        store.merge_node(&person, extra).await.unwrap();
        store.merge_edge("ACTED_IN", &person, &movie).await.unwrap();

        assert_eq!(store.edge_count(), 1);

        // Reading the edge back sees the updated node, not a stale snapshot.
        let edges = store.match_edges(Some("ACTED_IN"), None, None).await.unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].from.properties.get("name").unwrap(), "Ann Blake");
    }

    #[tokio::test]
    async fn test_match_edges_filters() {
        let store = MemoryStore::new();
        let ann = NodeKey::new("Person", [("firstName", "Ann"), ("lastName", "Blake")]);
        let bob = NodeKey::new("Person", [("firstName", "Bob"), ("lastName", "Stone")]);
        let movie = movie_key("X");

        for key in [&ann, &bob, &movie] {
            store.merge_node(key, Properties::new()).await.unwrap();
        }
        store.merge_edge("ACTED_IN", &ann, &movie).await.unwrap();
        store.merge_edge("DIRECTED", &bob, &movie).await.unwrap();

        let all = store.match_edges(None, None, Some(&movie)).await.unwrap();
        assert_eq!(all.len(), 2);

        let directed = store
            .match_edges(Some("DIRECTED"), None, Some(&movie))
            .await
            .unwrap();
        assert_eq!(directed.len(), 1);
        assert!(bob.matches(&directed[0].from.label, &directed[0].from.properties));
    }
}
