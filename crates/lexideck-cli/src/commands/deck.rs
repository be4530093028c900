//! The `lexideck deck` commands.

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Table};

use lexideck_core::model::{DeckId, NewDeck};
use lexideck_core::overview::{deck_overviews, DeckOverview};
use lexideck_core::traits::DeckStore;

#[derive(Subcommand)]
pub enum DeckAction {
    /// List decks with their card counts
    List,
    /// Create a deck
    Create { name: String },
    /// Rename a deck
    Rename { id: i64, name: String },
    /// Delete a deck and all of its cards
    Delete { id: i64 },
}

pub async fn execute(action: DeckAction, config_path: Option<PathBuf>) -> Result<()> {
    let (_, store) = super::open(config_path)?;

    match action {
        DeckAction::List => {
            let overviews = deck_overviews(store.as_ref(), store.as_ref()).await?;
            if overviews.is_empty() {
                println!("No decks yet. Create one with `lexideck deck create NAME`.");
            } else {
                println!("{}", overview_table(&overviews));
            }
        }
        DeckAction::Create { name } => {
            let deck = store.insert_deck(NewDeck::new(&name)?).await?;
            println!("Created deck {} ({})", deck.id, deck.name);
        }
        DeckAction::Rename { id, name } => {
            let deck = store.rename_deck(DeckId(id), NewDeck::new(&name)?).await?;
            println!("Renamed deck {} to {}", deck.id, deck.name);
        }
        DeckAction::Delete { id } => {
            store.delete_deck(DeckId(id)).await?;
            println!("Deleted deck {id}");
        }
    }

    Ok(())
}

fn overview_table(overviews: &[DeckOverview]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Cards", "Known"]);
    for o in overviews {
        table.add_row(vec![
            Cell::new(o.deck.id),
            Cell::new(&o.deck.name),
            Cell::new(o.total_cards),
            Cell::new(o.known_cards),
        ]);
    }
    table
}
