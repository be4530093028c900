//! The `lexideck card` commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{Cell, Table};

use lexideck_core::model::{Card, CardId, DeckId, NewCard};
use lexideck_core::traits::{prefill_translation, CardStore, DictionaryLookup};
use lexideck_providers::create_dictionary;

#[derive(Subcommand)]
pub enum CardAction {
    /// List the cards of a deck, newest first
    List { deck: i64 },
    /// Add a card to a deck
    Add {
        deck: i64,
        word: String,
        translation: Option<String>,

        /// Fill a missing translation from the dictionary
        #[arg(long)]
        lookup: bool,
    },
    /// Change a card's word and translation
    Edit {
        id: i64,
        word: String,
        translation: String,
    },
    /// Delete a card
    Delete { id: i64 },
    /// Look a word up in the dictionary
    Lookup { word: String },
}

pub async fn execute(action: CardAction, config_path: Option<PathBuf>) -> Result<()> {
    let (config, store) = super::open(config_path)?;

    match action {
        CardAction::List { deck } => {
            let deck = super::require_deck(store.as_ref(), deck).await?;
            let cards = store.cards_for_deck(deck.id).await?;
            if cards.is_empty() {
                println!("Deck {} ({}) has no cards.", deck.id, deck.name);
            } else {
                println!("{}", card_table(&cards));
            }
        }
        CardAction::Add {
            deck,
            word,
            translation,
            lookup,
        } => {
            let translation = match translation {
                Some(t) => t,
                None if lookup => {
                    let dictionary = create_dictionary(&config)?;
                    prefill_translation(&dictionary, &word, None)
                        .await
                        .with_context(|| format!("could not look up '{word}'"))?
                }
                None => anyhow::bail!("missing translation (pass one, or use --lookup)"),
            };
            let card = store
                .insert_card(NewCard::new(DeckId(deck), &word, &translation)?)
                .await?;
            println!("Added card {}: {} = {}", card.id, card.word, card.translation);
        }
        CardAction::Edit {
            id,
            word,
            translation,
        } => {
            let card = store
                .card_by_id(CardId(id))
                .await?
                .with_context(|| format!("card {id} not found"))?;
            let edited = card.edited(&word, &translation)?;
            store.update_card(&edited).await?;
            println!("Updated card {}: {} = {}", edited.id, edited.word, edited.translation);
        }
        CardAction::Delete { id } => {
            store.delete_card(CardId(id)).await?;
            println!("Deleted card {id}");
        }
        CardAction::Lookup { word } => {
            let dictionary = create_dictionary(&config)?;
            lookup(&dictionary, &word).await?;
        }
    }

    Ok(())
}

async fn lookup(dictionary: &dyn DictionaryLookup, word: &str) -> Result<()> {
    let bundle = dictionary.lookup(word).await?;

    match &bundle.phonetic {
        Some(phonetic) => println!("{} {}", bundle.word, phonetic),
        None => println!("{}", bundle.word),
    }
    println!("  {}", bundle.definition);
    if let Some(example) = &bundle.example {
        println!("  e.g. \"{example}\"");
    }
    if !bundle.synonyms.is_empty() {
        println!("  synonyms: {}", bundle.synonyms.join(", "));
    }
    if !bundle.antonyms.is_empty() {
        println!("  antonyms: {}", bundle.antonyms.join(", "));
    }
    if let Some(origin) = &bundle.origin {
        println!("  origin: {origin}");
    }
    if let Some(audio) = &bundle.audio_url {
        println!("  audio: {audio}");
    }
    Ok(())
}

fn card_table(cards: &[Card]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Word", "Translation", "Known", "Last reviewed"]);
    for card in cards {
        table.add_row(vec![
            Cell::new(card.id),
            Cell::new(&card.word),
            Cell::new(&card.translation),
            Cell::new(if card.is_known { "yes" } else { "no" }),
            Cell::new(
                card.last_reviewed_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "never".into()),
            ),
        ]);
    }
    table
}
