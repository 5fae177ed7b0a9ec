//! CLI command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cinegraph_db::DbPool;

pub mod db;
pub mod graph;
pub mod report;

/// Cinegraph - film dataset analytics and graph reconciliation
#[derive(Parser)]
#[command(name = "cinegraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the SQLite database file
    #[arg(long, global = true, env = "CINEGRAPH_DB", default_value = "cinegraph.db")]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Database bootstrap
    #[command(subcommand)]
    Db(db::DbCommands),

    /// Analytics reports over the relational dataset
    #[command(subcommand)]
    Report(report::ReportCommands),

    /// Neo4j graph reconciliation and inspection
    #[command(subcommand)]
    Graph(graph::GraphCommands),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Db(cmd) => db::execute(cmd, &self.db),
            Commands::Report(cmd) => {
                let pool = open_pool(&self.db)?;
                report::execute(cmd, &pool)
            }
            Commands::Graph(cmd) => {
                let pool = open_pool(&self.db)?;
                graph::execute(cmd, &pool).await
            }
        }
    }
}

fn open_pool(path: &std::path::Path) -> Result<DbPool> {
    DbPool::open(path).with_context(|| format!("Failed to open database at {}", path.display()))
}
