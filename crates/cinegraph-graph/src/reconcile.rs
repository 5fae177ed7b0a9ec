//! Graph reconciliation layer.
//!
//! Translates relational facts ("person P acted in movie M") into
//! idempotent node/edge upserts and verifies the resulting graph state.
//! Re-applying the same facts never creates duplicate persons, movies or
//! relationships: every entity goes through the merge path, keyed on its
//! natural key.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use cinegraph_core::FactRow;

use crate::error::{GraphError, GraphResult};
use crate::store::{GraphEdge, GraphNode, GraphStore, NodeKey, Properties};

pub const PERSON_LABEL: &str = "Person";
pub const MOVIE_LABEL: &str = "Movie";

/// Natural key of a person node: first and last name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PersonKey {
    pub first_name: String,
    pub last_name: String,
}

impl PersonKey {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// Split a display name on the first space. Single-token names keep
    /// an empty last name; multi-word last names cannot be recovered from
    /// a flat display name, so the split is deterministic rather than
    /// clever.
    pub fn from_display_name(name: &str) -> Self {
        match name.split_once(' ') {
            Some((first, last)) => Self::new(first, last),
            None => Self::new(name, ""),
        }
    }

    pub fn full_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }

    fn node_key(&self) -> NodeKey {
        NodeKey::new(
            PERSON_LABEL,
            [
                ("firstName", self.first_name.as_str()),
                ("lastName", self.last_name.as_str()),
            ],
        )
    }
}

/// Natural key of a movie node: its title.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MovieKey {
    pub title: String,
}

impl MovieKey {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into() }
    }

    fn node_key(&self) -> NodeKey {
        NodeKey::new(MOVIE_LABEL, [("title", self.title.as_str())])
    }
}

/// One intended graph fact: person held `role` on movie.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct CastFact {
    pub person: PersonKey,
    pub movie: MovieKey,
    pub role: String,
}

/// Relationship type for a role token: `"acted in"` becomes `ACTED_IN`.
pub fn relationship_type(role: &str) -> String {
    let mut rel = String::with_capacity(role.len());
    for c in role.chars() {
        if c.is_ascii_alphanumeric() {
            rel.push(c.to_ascii_uppercase());
        } else if !rel.ends_with('_') && !rel.is_empty() {
            rel.push('_');
        }
    }
    rel.trim_end_matches('_').to_string()
}

/// Bridge relational fact rows to graph facts, preserving first-occurrence
/// order and dropping duplicates and role-less rows.
pub fn facts_from_rows(rows: &[FactRow]) -> Vec<CastFact> {
    let mut seen = BTreeSet::new();
    let mut facts = Vec::new();
    for row in rows {
        let Some(role) = row.role_token() else { continue };
        if row.validate().is_err() || row.counterpart_name.is_empty() {
            continue;
        }
        let fact = CastFact {
            person: PersonKey::from_display_name(&row.entity_name),
            movie: MovieKey::new(row.counterpart_name.clone()),
            role: role.to_string(),
        };
        if seen.insert(fact.clone()) {
            facts.push(fact);
        }
    }
    facts
}

/// Role buckets of a movie's inbound relationships.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MovieSummary {
    pub directors: BTreeSet<String>,
    pub actors: BTreeSet<String>,
}

/// A fact that failed to reconcile, with the error pinned to it.
#[derive(Debug)]
pub struct FactFailure {
    pub fact: CastFact,
    pub error: GraphError,
}

/// Outcome of a batch reconciliation.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub applied: usize,
    pub failures: Vec<FactFailure>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Idempotent upsert front-end over a [`GraphStore`].
pub struct Reconciler<S> {
    store: S,
}

impl<S: GraphStore> Reconciler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Upsert a person node keyed on (firstName, lastName).
    ///
    /// Always the merge path; the unconditional create path is never used
    /// for entities that carry a natural key.
    pub async fn ensure_person(&self, person: &PersonKey) -> GraphResult<GraphNode> {
        let extra: Properties = [("name".to_string(), person.full_name())].into();
        self.store.merge_node(&person.node_key(), extra).await
    }

    /// Upsert a movie node keyed on title.
    pub async fn ensure_movie(&self, movie: &MovieKey) -> GraphResult<GraphNode> {
        self.store.merge_node(&movie.node_key(), Properties::new()).await
    }

    /// Upsert the typed relationship, creating both endpoints if absent.
    ///
    /// Ensuring the endpoints first means a missing node can never make
    /// the edge merge silently match nothing; if an endpoint ensure fails,
    /// the relationship is not attempted.
    pub async fn ensure_relationship(
        &self,
        role: &str,
        person: &PersonKey,
        movie: &MovieKey,
    ) -> GraphResult<GraphEdge> {
        self.ensure_person(person).await?;
        self.ensure_movie(movie).await?;
        self.store
            .merge_edge(&relationship_type(role), &person.node_key(), &movie.node_key())
            .await
    }

    /// Read-only post-condition check for a single relationship.
    pub async fn verify_relationship_exists(
        &self,
        role: &str,
        person: &PersonKey,
        movie: &MovieKey,
    ) -> GraphResult<bool> {
        let edges = self
            .store
            .match_edges(
                Some(&relationship_type(role)),
                Some(&person.node_key()),
                Some(&movie.node_key()),
            )
            .await?;
        Ok(!edges.is_empty())
    }

    /// Bucket a movie's inbound relationships into directors and actors.
    ///
    /// A movie with no relationships yields empty sets, not an error.
    pub async fn summarize(&self, movie: &MovieKey) -> GraphResult<MovieSummary> {
        let edges = self
            .store
            .match_edges(None, None, Some(&movie.node_key()))
            .await?;

        let mut summary = MovieSummary::default();
        for edge in edges {
            let name = edge
                .from
                .properties
                .get("name")
                .cloned()
                .unwrap_or_else(|| {
                    let first = edge.from.properties.get("firstName").cloned().unwrap_or_default();
                    let last = edge.from.properties.get("lastName").cloned().unwrap_or_default();
                    format!("{first} {last}").trim().to_string()
                });
            match edge.rel_type.as_str() {
                "DIRECTED" => {
                    summary.directors.insert(name);
                }
                "ACTED_IN" => {
                    summary.actors.insert(name);
                }
                other => debug!(rel = other, movie = %movie.title, "Ignoring relationship type in summary"),
            }
        }
        Ok(summary)
    }

    /// Apply a batch of facts one at a time, in caller-supplied order.
    ///
    /// Each fact is reconciled and then verified; one fact's failure never
    /// aborts its siblings.
    pub async fn reconcile_batch(&self, facts: &[CastFact]) -> BatchReport {
        let mut report = BatchReport::default();

        for fact in facts {
            match self.apply_fact(fact).await {
                Ok(()) => report.applied += 1,
                Err(error) => {
                    warn!(%error, person = %fact.person.full_name(), movie = %fact.movie.title, "Fact failed to reconcile");
                    report.failures.push(FactFailure {
                        fact: fact.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            applied = report.applied,
            failed = report.failures.len(),
            "Batch reconciliation complete"
        );
        report
    }

    async fn apply_fact(&self, fact: &CastFact) -> GraphResult<()> {
        let edge = self
            .ensure_relationship(&fact.role, &fact.person, &fact.movie)
            .await?;
        debug!(rel = %edge.rel_type, "Relationship merged");

        if !self
            .verify_relationship_exists(&fact.role, &fact.person, &fact.movie)
            .await?
        {
            return Err(GraphError::operation(
                "verify_relationship",
                format!(
                    "{}-[{}]->{}",
                    fact.person.full_name(),
                    relationship_type(&fact.role),
                    fact.movie.title
                ),
                anyhow::anyhow!("relationship absent after merge"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use async_trait::async_trait;

    fn ann() -> PersonKey {
        PersonKey::new("Ann", "Blake")
    }

    fn movie_x() -> MovieKey {
        MovieKey::new("X")
    }

    #[test]
    fn test_relationship_type_mapping() {
        assert_eq!(relationship_type("acted in"), "ACTED_IN");
        assert_eq!(relationship_type("directed"), "DIRECTED");
        assert_eq!(relationship_type("casting director"), "CASTING_DIRECTOR");
        assert_eq!(relationship_type("self!"), "SELF");
    }

    #[test]
    fn test_person_key_from_display_name() {
        assert_eq!(
            PersonKey::from_display_name("Jack Black"),
            PersonKey::new("Jack", "Black")
        );
        assert_eq!(
            PersonKey::from_display_name("Joachim Bisch Peuchet"),
            PersonKey::new("Joachim", "Bisch Peuchet")
        );
        let mononym = PersonKey::from_display_name("Teller");
        assert_eq!(mononym.last_name, "");
        assert_eq!(mononym.full_name(), "Teller");
    }

    #[test]
    fn test_facts_from_rows_dedups_and_filters() {
        let rows = vec![
            FactRow::new("P1", "Ann Blake", "F1", "Movie A", Some("acted in".into()), None),
            FactRow::new("P1", "Ann Blake", "F1", "Movie A", Some("acted in".into()), None),
            FactRow::new("P1", "Ann Blake", "F1", "Movie A", Some("directed".into()), None),
            FactRow::new("P2", "Bob Stone", "F1", "Movie A", None, None),
            FactRow::new("", "Ghost", "F1", "Movie A", Some("acted in".into()), None),
        ];
        let facts = facts_from_rows(&rows);
        assert_eq!(facts.len(), 2);
        assert_eq!(facts[0].role, "acted in");
        assert_eq!(facts[1].role, "directed");
        assert!(facts.iter().all(|f| f.person.first_name == "Ann"));
    }

    #[tokio::test]
    async fn test_ensure_relationship_is_idempotent() {
        let reconciler = Reconciler::new(MemoryStore::new());

        reconciler
            .ensure_relationship("acted in", &ann(), &movie_x())
            .await
            .unwrap();
        assert!(reconciler
            .verify_relationship_exists("acted in", &ann(), &movie_x())
            .await
            .unwrap());

        reconciler
            .ensure_relationship("acted in", &ann(), &movie_x())
            .await
            .unwrap();
        assert!(reconciler
            .verify_relationship_exists("acted in", &ann(), &movie_x())
            .await
            .unwrap());

        assert_eq!(reconciler.store().edge_count(), 1);
        // Endpoints were created once each, through the merge path.
        assert_eq!(reconciler.store().node_count(), 2);
    }

    #[tokio::test]
    async fn test_ensure_movie_twice_keeps_one_node() {
        let reconciler = Reconciler::new(MemoryStore::new());

        let first = reconciler.ensure_movie(&movie_x()).await.unwrap();
        let second = reconciler.ensure_movie(&movie_x()).await.unwrap();
        assert_eq!(first.properties.get("title"), second.properties.get("title"));

        let nodes = reconciler
            .store()
            .match_nodes(&NodeKey::new(MOVIE_LABEL, [("title", "X")]))
            .await
            .unwrap();
        assert_eq!(nodes.len(), 1);
    }

    #[tokio::test]
    async fn test_verify_is_read_only_and_false_when_absent() {
        let reconciler = Reconciler::new(MemoryStore::new());
        assert!(!reconciler
            .verify_relationship_exists("acted in", &ann(), &movie_x())
            .await
            .unwrap());
        assert_eq!(reconciler.store().node_count(), 0);
    }

    #[tokio::test]
    async fn test_summarize_buckets_roles() {
        let reconciler = Reconciler::new(MemoryStore::new());
        reconciler
            .ensure_relationship("directed", &PersonKey::new("D", "One"), &movie_x())
            .await
            .unwrap();
        reconciler
            .ensure_relationship("acted in", &PersonKey::new("A", "Two"), &movie_x())
            .await
            .unwrap();

        let summary = reconciler.summarize(&movie_x()).await.unwrap();
        assert_eq!(summary.directors, BTreeSet::from(["D One".to_string()]));
        assert_eq!(summary.actors, BTreeSet::from(["A Two".to_string()]));
    }

    #[tokio::test]
    async fn test_summarize_empty_movie_yields_empty_sets() {
        let reconciler = Reconciler::new(MemoryStore::new());
        reconciler.ensure_movie(&movie_x()).await.unwrap();

        let summary = reconciler.summarize(&movie_x()).await.unwrap();
        assert!(summary.directors.is_empty());
        assert!(summary.actors.is_empty());
    }

    /// Store double that rejects one specific person, for isolation tests.
    struct RejectingStore {
        inner: MemoryStore,
        reject_first_name: String,
    }

    #[async_trait]
    impl GraphStore for RejectingStore {
        async fn create_node(&self, label: &str, properties: Properties) -> GraphResult<GraphNode> {
            self.inner.create_node(label, properties).await
        }

        async fn merge_node(&self, key: &NodeKey, extra: Properties) -> GraphResult<GraphNode> {
            if key.properties.get("firstName") == Some(&self.reject_first_name) {
                return Err(GraphError::operation(
                    "merge_node",
                    key.to_string(),
                    anyhow::anyhow!("store unreachable"),
                ));
            }
            self.inner.merge_node(key, extra).await
        }

        async fn merge_edge(
            &self,
            rel_type: &str,
            from: &NodeKey,
            to: &NodeKey,
        ) -> GraphResult<GraphEdge> {
            self.inner.merge_edge(rel_type, from, to).await
        }

        async fn match_nodes(&self, key: &NodeKey) -> GraphResult<Vec<GraphNode>> {
            self.inner.match_nodes(key).await
        }

        async fn match_edges(
            &self,
            rel_type: Option<&str>,
            from: Option<&NodeKey>,
            to: Option<&NodeKey>,
        ) -> GraphResult<Vec<GraphEdge>> {
            self.inner.match_edges(rel_type, from, to).await
        }
    }

    #[tokio::test]
    async fn test_batch_isolates_failures() {
        let reconciler = Reconciler::new(RejectingStore {
            inner: MemoryStore::new(),
            reject_first_name: "Bad".to_string(),
        });

        let facts = vec![
            CastFact {
                person: ann(),
                movie: movie_x(),
                role: "acted in".to_string(),
            },
            CastFact {
                person: PersonKey::new("Bad", "Actor"),
                movie: movie_x(),
                role: "acted in".to_string(),
            },
            CastFact {
                person: PersonKey::new("Cleo", "Fox"),
                movie: movie_x(),
                role: "directed".to_string(),
            },
        ];

        let report = reconciler.reconcile_batch(&facts).await;
        assert_eq!(report.applied, 2);
        assert_eq!(report.failures.len(), 1);
        assert!(!report.is_clean());
        assert_eq!(report.failures[0].fact.person.first_name, "Bad");

        // A failed endpoint ensure never produced a dangling edge, and the
        // sibling facts landed.
        assert_eq!(reconciler.store().inner.edge_count(), 2);
        assert!(reconciler
            .verify_relationship_exists("directed", &PersonKey::new("Cleo", "Fox"), &movie_x())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_batch_is_reapplicable() {
        let reconciler = Reconciler::new(MemoryStore::new());
        let facts = facts_from_rows(&[
            FactRow::new("P1", "Ann Blake", "F1", "Movie A", Some("acted in".into()), None),
            FactRow::new("P1", "Ann Blake", "F1", "Movie A", Some("directed".into()), None),
            FactRow::new("P2", "Bob Stone", "F1", "Movie A", Some("acted in".into()), None),
        ]);

        let first = reconciler.reconcile_batch(&facts).await;
        assert_eq!(first.applied, 3);
        let second = reconciler.reconcile_batch(&facts).await;
        assert_eq!(second.applied, 3);

        // Two persons, one movie, three edges; no duplicates on re-apply.
        assert_eq!(reconciler.store().node_count(), 3);
        assert_eq!(reconciler.store().edge_count(), 3);
    }
}
