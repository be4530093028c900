//! lexideck-core: Vocabulary model, store traits, and review sessions.
//!
//! This crate holds the deck/card data model, the store and dictionary
//! traits the rest of the workspace implements, the study and quiz session
//! state machines, and the deck statistics aggregator.

pub mod error;
pub mod model;
pub mod overview;
pub mod quiz;
pub mod state;
pub mod statistics;
pub mod study;
pub mod traits;

#[cfg(test)]
mod testing;
