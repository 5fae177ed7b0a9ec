//! Neo4j connection handling.

use anyhow::{Context, Result};
use neo4rs::{ConfigBuilder, Graph, Query};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Bolt connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "neo4j".to_string(),
        }
    }
}

impl GraphConfig {
    /// Read connection settings from `NEO4J_URI`, `NEO4J_USER` and
    /// `NEO4J_PASSWORD`, falling back to the defaults for unset variables.
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            uri: std::env::var("NEO4J_URI").unwrap_or(default.uri),
            user: std::env::var("NEO4J_USER").unwrap_or(default.user),
            password: std::env::var("NEO4J_PASSWORD").unwrap_or(default.password),
        }
    }
}

/// Handle on a Neo4j connection pool.
///
/// Cypher generation lives in the store layer; this type only moves
/// statements and rows across the wire.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Open a connection pool and verify the server answers.
    ///
    /// `Graph::connect` only builds the pool; the first bolt handshake
    /// happens on the first statement. Running `RETURN 1` here surfaces an
    /// unreachable or misconfigured server at connect time, where the
    /// error still names the connection step.
    pub async fn connect(config: &GraphConfig) -> Result<Self> {
        let pool_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db("neo4j")
            // Reconciliation issues statements one at a time; a second
            // connection only covers the ping racing a first command.
            .max_connections(2)
            // Result sets here are cast lists and count rows, well under
            // one fetch batch.
            .fetch_size(200)
            .build()
            .context("invalid Neo4j configuration")?;

        let graph = Graph::connect(pool_config)
            .await
            .context("failed to open Neo4j connection pool")?;

        let client = Self { graph };
        client
            .execute(Query::new("RETURN 1".to_string()))
            .await
            .context("Neo4j did not answer the connection check")?;
        Ok(client)
    }

    /// Connect using environment configuration.
    pub async fn connect_from_env() -> Result<Self> {
        Self::connect(&GraphConfig::from_env()).await
    }

    /// Run a statement, discarding any rows it produces.
    pub async fn execute(&self, query: Query) -> Result<()> {
        self.graph
            .run(query)
            .await
            .context("Neo4j statement failed")?;
        Ok(())
    }

    /// Run a statement and collect every row it returns.
    pub async fn query(&self, query: Query) -> Result<Vec<neo4rs::Row>> {
        let mut stream = self
            .graph
            .execute(query)
            .await
            .context("Neo4j query failed")?;

        let mut rows = Vec::new();
        while let Some(row) = stream.next().await.context("Neo4j row stream failed")? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Run a statement expected to yield at most one row and extract one
    /// column from it. `Ok(None)` means the statement matched nothing.
    pub async fn query_scalar<T: DeserializeOwned>(
        &self,
        query: Query,
        column: &str,
    ) -> Result<Option<T>> {
        match self.query(query).await?.into_iter().next() {
            Some(row) => {
                let value: T = row
                    .get(column)
                    .map_err(|e| anyhow::anyhow!("column {column:?} missing or mistyped: {e:?}"))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Node and relationship totals, for status display.
    pub async fn get_counts(&self) -> Result<GraphCounts> {
        Ok(GraphCounts {
            nodes: self.count("MATCH (n) RETURN count(n) AS total").await?,
            relationships: self
                .count("MATCH ()-[r]->() RETURN count(r) AS total")
                .await?,
        })
    }

    async fn count(&self, statement: &str) -> Result<usize> {
        let total: i64 = self
            .query_scalar(Query::new(statement.to_string()), "total")
            .await?
            .unwrap_or(0);
        Ok(total as usize)
    }
}

/// Node and relationship counts.
#[derive(Debug, Clone)]
pub struct GraphCounts {
    pub nodes: usize,
    pub relationships: usize,
}
