//! Core trait definitions for the external collaborators.
//!
//! The session engine only consumes these; the `lexideck-providers` crate
//! implements them on top of SQLite, memory, and HTTP.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LookupError, StoreError};
use crate::model::{Card, CardId, Deck, DeckId, NewCard, NewDeck};

// ---------------------------------------------------------------------------
// Card store
// ---------------------------------------------------------------------------

/// Durable card storage.
#[async_trait]
pub trait CardStore: Send + Sync {
    /// All cards of a deck, newest first. Consistent as of the call.
    async fn cards_for_deck(&self, deck_id: DeckId) -> Result<Vec<Card>, StoreError>;

    /// Up to `limit` distinct cards from `deck_id`, never `exclude_id`,
    /// sampled without replacement.
    async fn random_cards_excluding(
        &self,
        deck_id: DeckId,
        exclude_id: CardId,
        limit: usize,
    ) -> Result<Vec<Card>, StoreError>;

    /// Up to `limit` distinct cards from `deck_id`, sampled without replacement.
    async fn random_cards(&self, deck_id: DeckId, limit: usize) -> Result<Vec<Card>, StoreError>;

    /// Record a review verdict and its timestamp.
    async fn set_known_status(
        &self,
        card_id: CardId,
        is_known: bool,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn card_count(&self, deck_id: DeckId) -> Result<usize, StoreError>;

    async fn known_card_count(&self, deck_id: DeckId) -> Result<usize, StoreError>;

    /// Cards of a deck not yet marked known.
    async fn unknown_cards(&self, deck_id: DeckId) -> Result<Vec<Card>, StoreError>;

    async fn card_by_id(&self, card_id: CardId) -> Result<Option<Card>, StoreError>;

    async fn insert_card(&self, card: NewCard) -> Result<Card, StoreError>;

    /// Persist an edited word/translation. Bumps `updated_at`.
    async fn update_card(&self, card: &Card) -> Result<(), StoreError>;

    async fn delete_card(&self, card_id: CardId) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Deck store
// ---------------------------------------------------------------------------

/// Durable deck storage. Deleting a deck deletes its cards.
#[async_trait]
pub trait DeckStore: Send + Sync {
    async fn deck_by_id(&self, deck_id: DeckId) -> Result<Option<Deck>, StoreError>;

    /// All decks, most recently updated first.
    async fn all_decks(&self) -> Result<Vec<Deck>, StoreError>;

    async fn insert_deck(&self, deck: NewDeck) -> Result<Deck, StoreError>;

    async fn rename_deck(&self, deck_id: DeckId, deck: NewDeck) -> Result<Deck, StoreError>;

    async fn delete_deck(&self, deck_id: DeckId) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Dictionary lookup
// ---------------------------------------------------------------------------

/// Word definitions used to pre-fill a card's translation.
#[async_trait]
pub trait DictionaryLookup: Send + Sync {
    async fn lookup(&self, word: &str) -> Result<DefinitionBundle, LookupError>;
}

/// The parts of a dictionary entry we surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionBundle {
    /// The word as the dictionary spells it.
    pub word: String,
    /// First definition of the first meaning.
    pub definition: String,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub antonyms: Vec<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub phonetic: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
}

/// Resolve the translation for a new card, consulting the dictionary only
/// when the caller did not supply one.
pub async fn prefill_translation(
    dictionary: &dyn DictionaryLookup,
    word: &str,
    translation: Option<&str>,
) -> Result<String, LookupError> {
    match translation.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => Ok(t.to_string()),
        None => {
            let bundle = dictionary.lookup(word.trim()).await?;
            tracing::debug!(word = %bundle.word, "translation pre-filled from dictionary");
            Ok(bundle.definition)
        }
    }
}
