//! Graph reconciliation and inspection commands.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use cinegraph_db::queries::facts;
use cinegraph_db::DbPool;
use cinegraph_graph::{
    facts_from_rows, schema, GraphClient, MovieKey, Neo4jStore, PersonKey, Reconciler,
};

#[derive(Subcommand)]
pub enum GraphCommands {
    /// Reconcile the relational facts into Neo4j (idempotent)
    Sync,

    /// Show the director/actor buckets of a movie
    Summary {
        /// Movie title
        title: String,
    },

    /// Check one relationship
    Verify {
        first_name: String,
        last_name: String,
        /// Movie title
        title: String,
        /// Role token, e.g. "acted in"
        #[arg(default_value = "acted in")]
        role: String,
    },

    /// Show graph node/relationship counts
    Status,
}

pub async fn execute(cmd: GraphCommands, pool: &DbPool) -> Result<()> {
    let client = GraphClient::connect_from_env().await?;

    match cmd {
        GraphCommands::Sync => cmd_sync(client, pool).await,
        GraphCommands::Summary { title } => cmd_summary(client, &title).await,
        GraphCommands::Verify {
            first_name,
            last_name,
            title,
            role,
        } => cmd_verify(client, &first_name, &last_name, &title, &role).await,
        GraphCommands::Status => cmd_status(client).await,
    }
}

async fn cmd_sync(client: GraphClient, pool: &DbPool) -> Result<()> {
    println!("{}", "Reconciling facts into the graph...".bold());

    schema::initialize_schema(&client).await?;

    let rows = facts::fetch_role_facts(pool)?;
    let cast = facts_from_rows(&rows);
    println!("  {} fact rows, {} distinct graph facts", rows.len(), cast.len());

    let reconciler = Reconciler::new(Neo4jStore::new(client));
    let report = reconciler.reconcile_batch(&cast).await;

    println!("\n{}", "Reconciliation complete:".green().bold());
    println!("  Facts applied and verified: {}", report.applied);
    if !report.is_clean() {
        println!("{}", format!("  Facts failed: {}", report.failures.len()).red());
        for failure in &report.failures {
            println!(
                "    {} / {} ({}): {}",
                failure.fact.person.full_name(),
                failure.fact.movie.title,
                failure.fact.role,
                failure.error
            );
        }
    }
    Ok(())
}

async fn cmd_summary(client: GraphClient, title: &str) -> Result<()> {
    let reconciler = Reconciler::new(Neo4jStore::new(client));
    let summary = reconciler.summarize(&MovieKey::new(title)).await?;

    println!("{}", title.cyan().bold());
    println!("{}", "Directors:".bold());
    if summary.directors.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for name in &summary.directors {
        println!("  {name}");
    }
    println!("{}", "Actors:".bold());
    if summary.actors.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for name in &summary.actors {
        println!("  {name}");
    }
    Ok(())
}

async fn cmd_verify(
    client: GraphClient,
    first_name: &str,
    last_name: &str,
    title: &str,
    role: &str,
) -> Result<()> {
    let reconciler = Reconciler::new(Neo4jStore::new(client));
    let exists = reconciler
        .verify_relationship_exists(
            role,
            &PersonKey::new(first_name, last_name),
            &MovieKey::new(title),
        )
        .await?;

    if exists {
        println!("{}", "Relationship exists.".green().bold());
    } else {
        println!("{}", "Relationship not found.".red().bold());
    }
    Ok(())
}

async fn cmd_status(client: GraphClient) -> Result<()> {
    let counts = client.get_counts().await?;
    println!("{}", "Graph status".bold());
    println!("  Nodes:         {}", counts.nodes);
    println!("  Relationships: {}", counts.relationships);
    Ok(())
}
