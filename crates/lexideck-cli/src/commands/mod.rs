pub mod card;
pub mod deck;
pub mod init;
pub mod quiz;
pub mod stats;
pub mod study;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use lexideck_core::model::{Deck, DeckId};
use lexideck_core::traits::DeckStore;
use lexideck_providers::{load_config_from, open_store, LexideckConfig, SqliteStore};

/// Load the config and open the database it points at.
pub(crate) fn open(config_path: Option<PathBuf>) -> Result<(LexideckConfig, Arc<SqliteStore>)> {
    let config = load_config_from(config_path.as_deref())?;
    let store = open_store(&config)?;
    tracing::debug!(database = %config.database_path.display(), "store opened");
    Ok((config, store))
}

/// Seeded when the config pins a seed, OS entropy otherwise.
pub(crate) fn session_rng(config: &LexideckConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

pub(crate) async fn require_deck(store: &dyn DeckStore, id: i64) -> Result<Deck> {
    store
        .deck_by_id(DeckId(id))
        .await?
        .with_context(|| format!("deck {id} not found"))
}
