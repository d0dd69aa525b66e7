mod commands;
mod config;
mod edamam;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;

use crate::commands::{cmd_barcode, cmd_delete, cmd_list, cmd_log, cmd_search, cmd_show};
use crate::config::Config;
use crate::edamam::EdamamClient;
use mealbook_core::db::MealStore;

#[derive(Parser)]
#[command(
    name = "mealbook",
    version,
    about = "Log meals from the Edamam food database into a local journal"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the food database
    Search {
        /// Search query
        query: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Look up a food by barcode
    Barcode {
        /// Barcode (UPC/EAN)
        code: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save a meal made of one or more foods
    Log {
        /// Foods to add, e.g. "2x chicken" "rice"
        items: Vec<String>,
        /// Add a food by barcode (repeatable)
        #[arg(short, long = "barcode", value_name = "CODE")]
        barcodes: Vec<String>,
        /// Take the first search result instead of prompting
        #[arg(long)]
        first: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List saved meals, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a meal and its foods
    Show {
        /// Meal ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a meal
    Delete {
        /// Meal ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    logging::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let mut store = MealStore::open(&config.db_path)?;
    let edamam = EdamamClient::new(&config.edamam_url, config.edamam.clone())?;

    match cli.command {
        Commands::Search { query, json } => cmd_search(&edamam, &query, json).await,
        Commands::Barcode { code, json } => cmd_barcode(&edamam, &code, json).await,
        Commands::Log {
            items,
            barcodes,
            first,
            json,
        } => cmd_log(&mut store, &edamam, &items, &barcodes, first, json).await,
        Commands::List { json } => cmd_list(&store, json),
        Commands::Show { id, json } => cmd_show(&store, &id, json),
        Commands::Delete { id, json } => cmd_delete(&mut store, &id, json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_log_command() {
        let cli = Cli::try_parse_from([
            "mealbook", "log", "2x chicken", "rice", "-b", "3017620422003", "--first",
        ])
        .unwrap();
        match cli.command {
            Commands::Log {
                items,
                barcodes,
                first,
                json,
            } => {
                assert_eq!(items, vec!["2x chicken", "rice"]);
                assert_eq!(barcodes, vec!["3017620422003"]);
                assert!(first);
                assert!(!json);
            }
            _ => panic!("expected log command"),
        }
    }
}
