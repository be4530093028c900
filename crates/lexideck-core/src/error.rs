//! Error taxonomy shared by the stores, the dictionary client, and the
//! session engine.
//!
//! Sessions never propagate these across their boundary: they fold them into
//! the `error` field of their state so the caller can display and clear them.

use thiserror::Error;

/// Input rejected before it reaches a store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("deck name must not be blank")]
    BlankDeckName,

    #[error("word must not be blank")]
    BlankWord,

    #[error("translation must not be blank")]
    BlankTranslation,
}

/// Errors returned by `CardStore` and `DeckStore` implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced deck or card does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A read or mutation failed inside the store.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// The record failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl StoreError {
    pub fn deck_not_found(id: impl Into<i64>) -> Self {
        StoreError::NotFound {
            entity: "deck",
            id: id.into(),
        }
    }

    pub fn card_not_found(id: impl Into<i64>) -> Self {
        StoreError::NotFound {
            entity: "card",
            id: id.into(),
        }
    }

    /// Returns `true` if the referenced record was absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Errors from a dictionary lookup.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The dictionary has no entry for the word.
    #[error("no definition found for '{0}'")]
    NotFound(String),

    /// Transport failure or an unexpected HTTP status.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with something we could not decode.
    #[error("malformed dictionary response: {0}")]
    Malformed(String),
}

impl LookupError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound(_))
    }
}
