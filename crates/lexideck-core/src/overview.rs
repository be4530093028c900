//! Deck list with per-deck card counts.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::Deck;
use crate::traits::{CardStore, DeckStore};

/// A deck together with its card totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckOverview {
    pub deck: Deck,
    pub total_cards: usize,
    pub known_cards: usize,
}

/// All decks, most recently updated first, with their counts.
pub async fn deck_overviews(
    decks: &dyn DeckStore,
    cards: &dyn CardStore,
) -> Result<Vec<DeckOverview>, StoreError> {
    let mut overviews = Vec::new();
    for deck in decks.all_decks().await? {
        let total_cards = cards.card_count(deck.id).await?;
        let known_cards = cards.known_card_count(deck.id).await?;
        overviews.push(DeckOverview {
            deck,
            total_cards,
            known_cards,
        });
    }
    Ok(overviews)
}
