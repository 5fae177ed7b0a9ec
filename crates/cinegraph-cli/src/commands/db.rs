//! Database bootstrap commands.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use cinegraph_db::{run_migrations, DbPool};

#[derive(Subcommand)]
pub enum DbCommands {
    /// Create or migrate the SQLite schema
    Init,
}

pub fn execute(cmd: DbCommands, db_path: &Path) -> Result<()> {
    match cmd {
        DbCommands::Init => cmd_init(db_path),
    }
}

fn cmd_init(db_path: &Path) -> Result<()> {
    let pool = DbPool::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
    run_migrations(&pool).context("Failed to run migrations")?;

    println!("{} {}", "Schema ready:".green().bold(), db_path.display());
    Ok(())
}
