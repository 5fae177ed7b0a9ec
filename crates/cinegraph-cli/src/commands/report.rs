//! Analytics report commands.
//!
//! Thin rendering over the analytics engine and the single-query report
//! lookups; no aggregation logic lives here.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use cinegraph_core::{
    aggregate_roles_by_entity, aggregate_roles_by_entity_and_counterpart,
    rank_combination_signatures, top_n_by_frequency, FactRow,
};
use cinegraph_db::queries::{facts, reports};
use cinegraph_db::DbPool;

use crate::output;

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Artists with multiple distinct roles across their career
    MultiRoles {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Maximum rows to display
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Artists with multiple distinct roles on the same film
    FilmRoles {
        #[arg(long)]
        json: bool,
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Most frequent role combinations
    Combinations {
        #[arg(long)]
        json: bool,
    },

    /// Films with the most distinct actors (ties at the boundary included)
    TopFilms {
        #[arg(short, default_value = "1")]
        n: usize,
        #[arg(long)]
        json: bool,
    },

    /// Most common artist birth years
    BirthYears {
        #[arg(short, default_value = "10")]
        n: usize,
        #[arg(long)]
        json: bool,
    },

    /// Dataset statistics and fixed lookups
    Stats {
        /// Artist name for the birth-year lookup
        #[arg(long, default_value = "Jack Black")]
        artist: String,
        /// Birth year for the born-in lookup
        #[arg(long, default_value = "1960")]
        born: i32,
    },
}

pub fn execute(cmd: ReportCommands, pool: &DbPool) -> Result<()> {
    match cmd {
        ReportCommands::MultiRoles { json, limit } => cmd_multi_roles(pool, json, limit),
        ReportCommands::FilmRoles { json, limit } => cmd_film_roles(pool, json, limit),
        ReportCommands::Combinations { json } => cmd_combinations(pool, json),
        ReportCommands::TopFilms { n, json } => cmd_top_films(pool, n, json),
        ReportCommands::BirthYears { n, json } => cmd_birth_years(pool, n, json),
        ReportCommands::Stats { artist, born } => cmd_stats(pool, &artist, born),
    }
}

fn cmd_multi_roles(pool: &DbPool, json: bool, limit: usize) -> Result<()> {
    let rows = facts::fetch_role_facts(pool)?;
    let groups = aggregate_roles_by_entity(&rows);

    if json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }
    println!("{}", "Artists with multiple roles across their career".bold());
    output::print_entity_groups(&groups, limit);
    println!("\nTotal: {}", groups.len());
    Ok(())
}

fn cmd_film_roles(pool: &DbPool, json: bool, limit: usize) -> Result<()> {
    let rows = facts::fetch_role_facts(pool)?;
    let groups = aggregate_roles_by_entity_and_counterpart(&rows);

    if json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }
    println!("{}", "Artists with multiple roles on the same film".bold());
    output::print_pair_groups(&groups, limit);
    println!("\nTotal: {}", groups.len());
    Ok(())
}

fn cmd_combinations(pool: &DbPool, json: bool) -> Result<()> {
    let rows = facts::fetch_role_facts(pool)?;
    // Combination frequency is counted over same-film role sets, reusing
    // the grouped sets in one pass.
    let groups = aggregate_roles_by_entity_and_counterpart(&rows);
    let signatures = rank_combination_signatures(&groups);

    if json {
        println!("{}", serde_json::to_string_pretty(&signatures)?);
        return Ok(());
    }
    println!("{}", "Most frequent role combinations".bold());
    output::print_signatures(&signatures);
    Ok(())
}

fn cmd_top_films(pool: &DbPool, n: usize, json: bool) -> Result<()> {
    let rows = facts::fetch_actor_film_facts(pool)?;
    let top = top_n_by_frequency(
        &rows,
        |row: &FactRow| Some((row.counterpart_name.clone(), row.counterpart_id.clone())),
        n,
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&top)?);
        return Ok(());
    }
    println!("{}", format!("Top {n} films by distinct actor count").bold());
    if top.is_empty() {
        println!("{}", "No acting assignments found.".dimmed());
        return Ok(());
    }
    for entry in &top {
        println!("{:<50} {:>4} actors", output::truncate(&entry.key.0, 50), entry.count);
    }
    if top.len() > n {
        println!("{}", format!("({} films tie at the boundary)", top.len()).dimmed());
    }
    Ok(())
}

fn cmd_birth_years(pool: &DbPool, n: usize, json: bool) -> Result<()> {
    let rows = facts::fetch_birth_year_facts(pool)?;
    let top = top_n_by_frequency(&rows, |row: &FactRow| row.year, n);

    if json {
        println!("{}", serde_json::to_string_pretty(&top)?);
        return Ok(());
    }
    println!("{}", format!("Top {n} artist birth years").bold());
    if top.is_empty() {
        println!("{}", "No usable birth years found.".dimmed());
        return Ok(());
    }
    for entry in &top {
        println!("{:>6}  {:>6} artists", entry.key, entry.count);
    }
    Ok(())
}

fn cmd_stats(pool: &DbPool, artist: &str, born: i32) -> Result<()> {
    let total = reports::count_artists(pool)?;
    println!("{}: {}", "Artists".bold(), total);

    match reports::artist_birth_year(pool, artist)? {
        Some(found) => {
            let year = found
                .birth_year
                .map_or_else(|| "unknown".to_string(), |y| y.to_string());
            println!("{}: born {}", found.name.bold(), year);
        }
        None => println!("{}: {}", artist.bold(), "not found".dimmed()),
    }

    let born_in = reports::artists_born_in(pool, born)?;
    println!("{}: {}", format!("Artists born in {born}").bold(), born_in.len());

    let multi = reports::artists_with_multiple_films(pool)?;
    println!("{}: {}", "Artists acting in more than one film".bold(), multi.len());

    println!("{}", "Distinct artists per role:".bold());
    for entry in reports::artists_per_role(pool)? {
        println!("  {:<20} {}", entry.role, entry.artist_count);
    }

    Ok(())
}
