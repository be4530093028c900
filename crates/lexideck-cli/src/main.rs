//! lexideck CLI: decks, cards, study and quiz sessions from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

use commands::card::CardAction;
use commands::deck::DeckAction;

#[derive(Parser)]
#[command(name = "lexideck", version, about = "Vocabulary flashcard trainer")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter lexideck.toml
    Init,

    /// Manage decks
    Deck {
        #[command(subcommand)]
        action: DeckAction,
    },

    /// Manage cards
    Card {
        #[command(subcommand)]
        action: CardAction,
    },

    /// Flip through a deck and mark each card known or unknown
    Study {
        /// Deck id
        deck: i64,
    },

    /// Multiple-choice quiz over a deck
    Quiz {
        /// Deck id
        deck: i64,
    },

    /// Show progress statistics for a deck
    Stats {
        /// Deck id
        deck: i64,

        /// Output format: table, json, markdown
        #[arg(long, default_value = "table")]
        format: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lexideck=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Deck { action } => commands::deck::execute(action, config).await,
        Commands::Card { action } => commands::card::execute(action, config).await,
        Commands::Study { deck } => commands::study::execute(deck, config).await,
        Commands::Quiz { deck } => commands::quiz::execute(deck, config).await,
        Commands::Stats { deck, format } => commands::stats::execute(deck, format, config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
