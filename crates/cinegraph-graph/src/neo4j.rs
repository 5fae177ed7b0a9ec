//! Neo4j-backed graph store.
//!
//! Generates Cypher for the store operations. Property values are always
//! bound as parameters; labels, relationship types and property names
//! cannot be parameterized in Cypher, so they are validated against a
//! strict identifier grammar before interpolation.

use async_trait::async_trait;
use neo4rs::Query;

use crate::client::GraphClient;
use crate::error::{GraphError, GraphResult};
use crate::store::{GraphEdge, GraphNode, GraphStore, NodeKey, Properties};

/// Graph store over a live Neo4j connection.
#[derive(Clone)]
pub struct Neo4jStore {
    client: GraphClient,
}

impl Neo4jStore {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// The underlying client, for raw status/verification queries.
    pub fn client(&self) -> &GraphClient {
        &self.client
    }
}

/// Reject anything that is not a plain Cypher identifier.
fn check_identifier(name: &str) -> GraphResult<()> {
    let mut chars = name.chars();
    let ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if ok {
        Ok(())
    } else {
        Err(GraphError::InvalidIdentifier(name.to_string()))
    }
}

/// Render ` {k: $prefix_k, …}` for a property map (empty string if none).
fn props_pattern(props: &Properties, prefix: &str) -> GraphResult<String> {
    if props.is_empty() {
        return Ok(String::new());
    }
    let mut parts = Vec::with_capacity(props.len());
    for key in props.keys() {
        check_identifier(key)?;
        parts.push(format!("{key}: ${prefix}{key}"));
    }
    Ok(format!(" {{{}}}", parts.join(", ")))
}

/// Bind property values under a parameter prefix.
fn bind(mut query: Query, props: &Properties, prefix: &str) -> Query {
    for (key, value) in props {
        query = query.param(&format!("{prefix}{key}"), value.as_str());
    }
    query
}

fn row_props(row: &neo4rs::Row, field: &str) -> anyhow::Result<Properties> {
    row.get::<Properties>(field)
        .map_err(|e| anyhow::anyhow!("failed to read '{field}': {e:?}"))
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn create_node(&self, label: &str, properties: Properties) -> GraphResult<GraphNode> {
        check_identifier(label)?;
        let pattern = props_pattern(&properties, "p_")?;
        let cypher = format!("CREATE (n:{label}{pattern}) RETURN properties(n) AS props");
        let query = bind(Query::new(cypher), &properties, "p_");

        let rows = self
            .client
            .query(query)
            .await
            .map_err(|e| GraphError::operation("create_node", label, e))?;
        let row = rows.into_iter().next().ok_or_else(|| {
            GraphError::operation("create_node", label, anyhow::anyhow!("no row returned"))
        })?;
        let props = row_props(&row, "props")
            .map_err(|e| GraphError::operation("create_node", label, e))?;

        Ok(GraphNode {
            label: label.to_string(),
            properties: props,
        })
    }

    async fn merge_node(&self, key: &NodeKey, extra: Properties) -> GraphResult<GraphNode> {
        check_identifier(&key.label)?;
        let pattern = props_pattern(&key.properties, "k_")?;

        let mut set_parts = Vec::with_capacity(extra.len());
        for prop in extra.keys() {
            check_identifier(prop)?;
            set_parts.push(format!("n.{prop} = $e_{prop}"));
        }
        let set_clause = if set_parts.is_empty() {
            String::new()
        } else {
            format!(" SET {}", set_parts.join(", "))
        };

        let cypher = format!(
            "MERGE (n:{}{pattern}){set_clause} RETURN properties(n) AS props",
            key.label
        );
        let query = bind(bind(Query::new(cypher), &key.properties, "k_"), &extra, "e_");

        let target = key.to_string();
        let rows = self
            .client
            .query(query)
            .await
            .map_err(|e| GraphError::operation("merge_node", &target, e))?;
        let row = rows.into_iter().next().ok_or_else(|| {
            GraphError::operation("merge_node", &target, anyhow::anyhow!("no row returned"))
        })?;
        let props =
            row_props(&row, "props").map_err(|e| GraphError::operation("merge_node", &target, e))?;

        Ok(GraphNode {
            label: key.label.clone(),
            properties: props,
        })
    }

    async fn merge_edge(
        &self,
        rel_type: &str,
        from: &NodeKey,
        to: &NodeKey,
    ) -> GraphResult<GraphEdge> {
        check_identifier(rel_type)?;
        check_identifier(&from.label)?;
        check_identifier(&to.label)?;
        let from_pattern = props_pattern(&from.properties, "f_")?;
        let to_pattern = props_pattern(&to.properties, "t_")?;

        // MATCH before MERGE: a missing endpoint must fail loudly instead
        // of quietly creating nothing.
        let cypher = format!(
            "MATCH (a:{}{from_pattern}) MATCH (b:{}{to_pattern}) \
             MERGE (a)-[r:{rel_type}]->(b) \
             RETURN properties(a) AS from_props, properties(b) AS to_props",
            from.label, to.label
        );
        let query = bind(
            bind(Query::new(cypher), &from.properties, "f_"),
            &to.properties,
            "t_",
        );

        let target = format!("{from}-[{rel_type}]->{to}");
        let rows = self
            .client
            .query(query)
            .await
            .map_err(|e| GraphError::operation("merge_edge", &target, e))?;
        let row = rows.into_iter().next().ok_or_else(|| {
            GraphError::operation(
                "merge_edge",
                &target,
                anyhow::anyhow!("one or both endpoints do not exist"),
            )
        })?;

        let from_props = row_props(&row, "from_props")
            .map_err(|e| GraphError::operation("merge_edge", &target, e))?;
        let to_props = row_props(&row, "to_props")
            .map_err(|e| GraphError::operation("merge_edge", &target, e))?;

        Ok(GraphEdge {
            rel_type: rel_type.to_string(),
            from: NodeKey {
                label: from.label.clone(),
                properties: from_props,
            },
            to: NodeKey {
                label: to.label.clone(),
                properties: to_props,
            },
        })
    }

    async fn match_nodes(&self, key: &NodeKey) -> GraphResult<Vec<GraphNode>> {
        check_identifier(&key.label)?;
        let pattern = props_pattern(&key.properties, "k_")?;
        let cypher = format!(
            "MATCH (n:{}{pattern}) RETURN properties(n) AS props",
            key.label
        );
        let query = bind(Query::new(cypher), &key.properties, "k_");

        let target = key.to_string();
        let rows = self
            .client
            .query(query)
            .await
            .map_err(|e| GraphError::operation("match_nodes", &target, e))?;

        let mut nodes = Vec::with_capacity(rows.len());
        for row in &rows {
            let props = row_props(row, "props")
                .map_err(|e| GraphError::operation("match_nodes", &target, e))?;
            nodes.push(GraphNode {
                label: key.label.clone(),
                properties: props,
            });
        }
        Ok(nodes)
    }

    async fn match_edges(
        &self,
        rel_type: Option<&str>,
        from: Option<&NodeKey>,
        to: Option<&NodeKey>,
    ) -> GraphResult<Vec<GraphEdge>> {
        let from_pattern = match from {
            Some(key) => {
                check_identifier(&key.label)?;
                format!("(a:{}{})", key.label, props_pattern(&key.properties, "f_")?)
            }
            None => "(a)".to_string(),
        };
        let to_pattern = match to {
            Some(key) => {
                check_identifier(&key.label)?;
                format!("(b:{}{})", key.label, props_pattern(&key.properties, "t_")?)
            }
            None => "(b)".to_string(),
        };
        let rel_pattern = match rel_type {
            Some(rel) => {
                check_identifier(rel)?;
                format!("[r:{rel}]")
            }
            None => "[r]".to_string(),
        };

        let cypher = format!(
            "MATCH {from_pattern}-{rel_pattern}->{to_pattern} \
             RETURN type(r) AS rel, \
                    labels(a)[0] AS from_label, properties(a) AS from_props, \
                    labels(b)[0] AS to_label, properties(b) AS to_props"
        );
        let mut query = Query::new(cypher);
        if let Some(key) = from {
            query = bind(query, &key.properties, "f_");
        }
        if let Some(key) = to {
            query = bind(query, &key.properties, "t_");
        }

        let target = format!(
            "{}-[{}]->{}",
            from.map_or_else(|| "()".to_string(), ToString::to_string),
            rel_type.unwrap_or("*"),
            to.map_or_else(|| "()".to_string(), ToString::to_string),
        );
        let rows = self
            .client
            .query(query)
            .await
            .map_err(|e| GraphError::operation("match_edges", &target, e))?;

        let mut edges = Vec::with_capacity(rows.len());
        for row in &rows {
            let read = || -> anyhow::Result<GraphEdge> {
                let rel: String = row
                    .get("rel")
                    .map_err(|e| anyhow::anyhow!("failed to read 'rel': {e:?}"))?;
                let from_label: String = row
                    .get("from_label")
                    .map_err(|e| anyhow::anyhow!("failed to read 'from_label': {e:?}"))?;
                let to_label: String = row
                    .get("to_label")
                    .map_err(|e| anyhow::anyhow!("failed to read 'to_label': {e:?}"))?;
                Ok(GraphEdge {
                    rel_type: rel,
                    from: NodeKey {
                        label: from_label,
                        properties: row_props(row, "from_props")?,
                    },
                    to: NodeKey {
                        label: to_label,
                        properties: row_props(row, "to_props")?,
                    },
                })
            };
            edges.push(read().map_err(|e| GraphError::operation("match_edges", &target, e))?);
        }
        Ok(edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_grammar() {
        assert!(check_identifier("Person").is_ok());
        assert!(check_identifier("ACTED_IN").is_ok());
        assert!(check_identifier("_private").is_ok());

        assert!(check_identifier("").is_err());
        assert!(check_identifier("9lives").is_err());
        assert!(check_identifier("Person) DETACH DELETE (n").is_err());
        assert!(check_identifier("acted in").is_err());
    }

    #[test]
    fn test_props_pattern_rendering() {
        let mut props = Properties::new();
        props.insert("firstName".into(), "Ann".into());
        props.insert("lastName".into(), "Blake".into());

        // BTreeMap keys render in sorted order.
        assert_eq!(
            props_pattern(&props, "k_").unwrap(),
            " {firstName: $k_firstName, lastName: $k_lastName}"
        );
        assert_eq!(props_pattern(&Properties::new(), "k_").unwrap(), "");

        props.insert("bad key".into(), "x".into());
        assert!(matches!(
            props_pattern(&props, "k_"),
            Err(GraphError::InvalidIdentifier(_))
        ));
    }
}
