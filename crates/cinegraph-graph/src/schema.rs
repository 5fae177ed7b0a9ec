//! Neo4j schema initialization (constraints and indexes).

use anyhow::Result;
use neo4rs::Query;
use tracing::info;

use crate::GraphClient;

/// Cypher statements for schema initialization.
const SCHEMA_STATEMENTS: &[&str] = &[
    // Movie identity is the title; merge relies on it being unique.
    "CREATE CONSTRAINT movie_title IF NOT EXISTS FOR (m:Movie) REQUIRE m.title IS UNIQUE",
    // Person identity is the (firstName, lastName) pair; composite
    // uniqueness is an enterprise feature, so community gets an index.
    "CREATE INDEX person_name IF NOT EXISTS FOR (p:Person) ON (p.firstName, p.lastName)",
];

/// Initialize Neo4j schema with constraints and indexes.
///
/// Safe to run multiple times - uses IF NOT EXISTS clauses.
pub async fn initialize_schema(client: &GraphClient) -> Result<()> {
    info!("Initializing Neo4j schema...");

    for statement in SCHEMA_STATEMENTS {
        client.execute(Query::new(statement.to_string())).await?;
    }

    info!("Neo4j schema initialized ({} statements)", SCHEMA_STATEMENTS.len());
    Ok(())
}
