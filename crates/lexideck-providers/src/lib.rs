//! lexideck-providers: Storage and dictionary backends.
//!
//! Implements the `CardStore`/`DeckStore` traits on SQLite and in memory,
//! `DictionaryLookup` over HTTP, and the configuration that wires them up.

pub mod config;
pub mod dictionary;
pub mod memory;
pub mod sqlite;

pub use config::{create_dictionary, load_config, load_config_from, open_store, LexideckConfig};
pub use dictionary::HttpDictionary;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
