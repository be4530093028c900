//! Core data model types for lexideck.
//!
//! Decks and cards as they are persisted, plus the validated input types used
//! to create or edit them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Store-assigned deck identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckId(pub i64);

/// Store-assigned card identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub i64);

impl fmt::Display for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<DeckId> for i64 {
    fn from(id: DeckId) -> Self {
        id.0
    }
}

impl From<CardId> for i64 {
    fn from(id: CardId) -> Self {
        id.0
    }
}

/// Name shown for a deck that could not be loaded.
pub const PLACEHOLDER_DECK_NAME: &str = "Unknown deck";

/// A named collection of cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub id: DeckId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deck {
    /// Stand-in used when a session is opened for a deck that no longer exists.
    pub fn placeholder(id: DeckId) -> Self {
        Self {
            id,
            name: PLACEHOLDER_DECK_NAME.to_string(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

/// One word/translation pair with its review status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub deck_id: DeckId,
    pub word: String,
    pub translation: String,
    pub is_known: bool,
    #[serde(default)]
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Apply a word/translation edit, trimming and validating both fields.
    ///
    /// The review status is left alone; `updated_at` is refreshed by the store.
    pub fn edited(&self, word: &str, translation: &str) -> Result<Card, ValidationError> {
        let (word, translation) = validate_pair(word, translation)?;
        Ok(Card {
            word,
            translation,
            ..self.clone()
        })
    }
}

/// Validated input for creating or renaming a deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeck {
    name: String,
}

impl NewDeck {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::BlankDeckName);
        }
        Ok(Self {
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Validated input for creating a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCard {
    deck_id: DeckId,
    word: String,
    translation: String,
}

impl NewCard {
    pub fn new(deck_id: DeckId, word: &str, translation: &str) -> Result<Self, ValidationError> {
        let (word, translation) = validate_pair(word, translation)?;
        Ok(Self {
            deck_id,
            word,
            translation,
        })
    }

    pub fn deck_id(&self) -> DeckId {
        self.deck_id
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn translation(&self) -> &str {
        &self.translation
    }

    /// Materialize the card once the store has assigned an id.
    pub fn into_card(self, id: CardId, now: DateTime<Utc>) -> Card {
        Card {
            id,
            deck_id: self.deck_id,
            word: self.word,
            translation: self.translation,
            is_known: false,
            last_reviewed_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

fn validate_pair(word: &str, translation: &str) -> Result<(String, String), ValidationError> {
    let word = word.trim();
    let translation = translation.trim();
    if word.is_empty() {
        return Err(ValidationError::BlankWord);
    }
    if translation.is_empty() {
        return Err(ValidationError::BlankTranslation);
    }
    Ok((word.to_string(), translation.to_string()))
}
