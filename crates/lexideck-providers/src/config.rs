//! Application configuration and backend factories.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::dictionary::{HttpDictionary, DEFAULT_BASE_URL};
use crate::sqlite::SqliteStore;

/// Top-level lexideck configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexideckConfig {
    /// SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// Base URL of the dictionary service.
    #[serde(default = "default_dictionary_url")]
    pub dictionary_base_url: String,
    /// Dictionary request timeout in seconds.
    #[serde(default = "default_dictionary_timeout")]
    pub dictionary_timeout_secs: u64,
    /// Fixed RNG seed for reproducible shuffles.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./lexideck.db")
}
fn default_dictionary_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_dictionary_timeout() -> u64 {
    10
}

impl Default for LexideckConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            dictionary_base_url: default_dictionary_url(),
            dictionary_timeout_secs: default_dictionary_timeout(),
            seed: None,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(&rest[start + 2..start + len]).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `lexideck.toml` in the current directory
/// 2. `~/.config/lexideck/config.toml`
///
/// Environment variable overrides: `LEXIDECK_DB`, `LEXIDECK_SEED`.
pub fn load_config() -> Result<LexideckConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<LexideckConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("lexideck.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<LexideckConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => LexideckConfig::default(),
    };

    if let Ok(db) = std::env::var("LEXIDECK_DB") {
        config.database_path = PathBuf::from(db);
    }
    if let Ok(seed) = std::env::var("LEXIDECK_SEED") {
        config.seed = Some(
            seed.trim()
                .parse()
                .with_context(|| format!("LEXIDECK_SEED is not a number: {seed}"))?,
        );
    }

    config.database_path = PathBuf::from(resolve_env_vars(&config.database_path.to_string_lossy()));
    config.dictionary_base_url = resolve_env_vars(&config.dictionary_base_url);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("lexideck"))
}

/// Open the configured database, creating it if needed.
pub fn open_store(config: &LexideckConfig) -> Result<Arc<SqliteStore>> {
    let store = SqliteStore::open(&config.database_path).with_context(|| {
        format!(
            "failed to open database: {}",
            config.database_path.display()
        )
    })?;
    Ok(Arc::new(store))
}

/// Build the dictionary client from the configuration.
pub fn create_dictionary(config: &LexideckConfig) -> Result<HttpDictionary> {
    HttpDictionary::new(&config.dictionary_base_url, config.dictionary_timeout_secs)
        .context("failed to build dictionary client")
}
