//! Free Dictionary API client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use lexideck_core::error::LookupError;
use lexideck_core::traits::{DefinitionBundle, DictionaryLookup};

pub const DEFAULT_BASE_URL: &str = "https://api.dictionaryapi.dev";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// HTTP dictionary lookup against `{base}/api/v2/entries/en/{word}`.
pub struct HttpDictionary {
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpDictionary {
    pub fn new(base_url: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let base = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url
        };
        let timeout_secs = if timeout_secs == 0 {
            DEFAULT_TIMEOUT_SECS
        } else {
            timeout_secs
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url: base.trim_end_matches('/').to_string(),
            timeout_secs,
            client,
        })
    }
}

#[derive(Deserialize)]
struct EntryResponse {
    word: String,
    #[serde(default)]
    phonetic: Option<String>,
    #[serde(default)]
    phonetics: Vec<PhoneticEntry>,
    #[serde(default)]
    origin: Option<String>,
    #[serde(default)]
    meanings: Vec<MeaningEntry>,
}

#[derive(Deserialize)]
struct PhoneticEntry {
    #[serde(default)]
    audio: Option<String>,
}

#[derive(Deserialize)]
struct MeaningEntry {
    #[serde(default)]
    definitions: Vec<DefinitionEntry>,
}

#[derive(Deserialize)]
struct DefinitionEntry {
    definition: String,
    #[serde(default)]
    example: Option<String>,
    #[serde(default)]
    synonyms: Vec<String>,
    #[serde(default)]
    antonyms: Vec<String>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

impl EntryResponse {
    fn into_bundle(self) -> Option<DefinitionBundle> {
        let first = self.meanings.first()?.definitions.first()?;
        let definition = first.definition.clone();
        let example = non_empty(first.example.clone());

        let all_definitions = || self.meanings.iter().flat_map(|m| &m.definitions);
        let synonyms = all_definitions()
            .flat_map(|d| d.synonyms.iter().cloned())
            .collect();
        let antonyms = all_definitions()
            .flat_map(|d| d.antonyms.iter().cloned())
            .collect();

        let audio_url = self
            .phonetics
            .into_iter()
            .find_map(|p| non_empty(p.audio));

        Some(DefinitionBundle {
            word: self.word,
            definition,
            example,
            synonyms,
            antonyms,
            origin: non_empty(self.origin),
            phonetic: non_empty(self.phonetic),
            audio_url,
        })
    }
}

impl HttpDictionary {
    /// The word is a single percent-encoded path segment.
    fn entry_url(&self, word: &str) -> Result<reqwest::Url, LookupError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| LookupError::Network(format!("invalid base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| LookupError::Network(format!("invalid base url: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "v2", "entries", "en", word]);
        Ok(url)
    }
}

#[async_trait]
impl DictionaryLookup for HttpDictionary {
    #[instrument(skip(self))]
    async fn lookup(&self, word: &str) -> Result<DefinitionBundle, LookupError> {
        let word = word.trim();
        if word.is_empty() {
            return Err(LookupError::NotFound(String::new()));
        }

        let url = self.entry_url(word)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LookupError::Network(format!("timed out after {}s", self.timeout_secs))
                } else {
                    LookupError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(LookupError::NotFound(word.to_string()));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Network(format!("HTTP {status}: {body}")));
        }

        let entries: Vec<EntryResponse> = response
            .json()
            .await
            .map_err(|e| LookupError::Malformed(e.to_string()))?;

        let bundle = entries
            .into_iter()
            .next()
            .and_then(EntryResponse::into_bundle)
            .ok_or_else(|| LookupError::NotFound(word.to_string()))?;

        tracing::debug!(word = %bundle.word, synonyms = bundle.synonyms.len(), "dictionary hit");
        Ok(bundle)
    }
}
