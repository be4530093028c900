//! SQLite-backed card and deck store.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::config::DbConfig;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::instrument;

use lexideck_core::error::StoreError;
use lexideck_core::model::{Card, CardId, Deck, DeckId, NewCard, NewDeck};
use lexideck_core::traits::{CardStore, DeckStore};

const CARD_COLUMNS: &str =
    "id, deck_id, word, translation, is_known, last_reviewed_at, created_at, updated_at";

/// Durable store over a single SQLite connection.
///
/// Every trait method runs its SQL on the blocking pool, so callers on the
/// async runtime never wait on disk I/O directly.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database file and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "opening database");
        let conn = Connection::open(path).map_err(persistence)?;
        Self::init(conn)
    }

    /// A private in-memory database, mostly for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(persistence)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)
            .map_err(persistence)?;
        conn.execute_batch(include_str!("schema.sql"))
            .map_err(persistence)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::Persistence("connection lock poisoned".into()))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Persistence(format!("database task failed: {e}")))?
    }
}

fn persistence(e: rusqlite::Error) -> StoreError {
    StoreError::Persistence(e.to_string())
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn card_from_row(row: &Row<'_>) -> rusqlite::Result<Card> {
    let last_reviewed: Option<String> = row.get(5)?;
    let created: String = row.get(6)?;
    let updated: String = row.get(7)?;
    Ok(Card {
        id: CardId(row.get(0)?),
        deck_id: DeckId(row.get(1)?),
        word: row.get(2)?,
        translation: row.get(3)?,
        is_known: row.get(4)?,
        last_reviewed_at: last_reviewed
            .as_deref()
            .map(|raw| parse_timestamp(5, raw))
            .transpose()?,
        created_at: parse_timestamp(6, &created)?,
        updated_at: parse_timestamp(7, &updated)?,
    })
}

fn deck_from_row(row: &Row<'_>) -> rusqlite::Result<Deck> {
    let created: String = row.get(2)?;
    let updated: String = row.get(3)?;
    Ok(Deck {
        id: DeckId(row.get(0)?),
        name: row.get(1)?,
        created_at: parse_timestamp(2, &created)?,
        updated_at: parse_timestamp(3, &updated)?,
    })
}

fn query_cards(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<Card>, StoreError> {
    let mut stmt = conn.prepare(sql).map_err(persistence)?;
    let rows = stmt.query_map(params, card_from_row).map_err(persistence)?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(persistence)
}

fn select_deck(conn: &Connection, deck_id: DeckId) -> Result<Option<Deck>, StoreError> {
    conn.query_row(
        "select id, name, created_at, updated_at from decks where id = ?1",
        params![deck_id.0],
        deck_from_row,
    )
    .optional()
    .map_err(persistence)
}

fn count(conn: &Connection, sql: &str, deck_id: DeckId) -> Result<usize, StoreError> {
    let n: i64 = conn
        .query_row(sql, params![deck_id.0], |row| row.get(0))
        .map_err(persistence)?;
    Ok(n as usize)
}

#[async_trait]
impl CardStore for SqliteStore {
    async fn cards_for_deck(&self, deck_id: DeckId) -> Result<Vec<Card>, StoreError> {
        self.with_conn(move |conn| {
            let sql = format!(
                "select {CARD_COLUMNS} from cards where deck_id = ?1 order by created_at desc, id desc"
            );
            query_cards(conn, &sql, params![deck_id.0])
        })
        .await
    }

    async fn random_cards_excluding(
        &self,
        deck_id: DeckId,
        exclude_id: CardId,
        limit: usize,
    ) -> Result<Vec<Card>, StoreError> {
        self.with_conn(move |conn| {
            let sql = format!(
                "select {CARD_COLUMNS} from cards where deck_id = ?1 and id != ?2 order by random() limit ?3"
            );
            query_cards(conn, &sql, params![deck_id.0, exclude_id.0, limit as i64])
        })
        .await
    }

    async fn random_cards(&self, deck_id: DeckId, limit: usize) -> Result<Vec<Card>, StoreError> {
        self.with_conn(move |conn| {
            let sql = format!(
                "select {CARD_COLUMNS} from cards where deck_id = ?1 order by random() limit ?2"
            );
            query_cards(conn, &sql, params![deck_id.0, limit as i64])
        })
        .await
    }

    #[instrument(skip(self))]
    async fn set_known_status(
        &self,
        card_id: CardId,
        is_known: bool,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.with_conn(move |conn| {
            let changed = conn
                .execute(
                    "update cards set is_known = ?1, last_reviewed_at = ?2 where id = ?3",
                    params![is_known, timestamp(at), card_id.0],
                )
                .map_err(persistence)?;
            if changed == 0 {
                return Err(StoreError::card_not_found(card_id));
            }
            Ok(())
        })
        .await
    }

    async fn card_count(&self, deck_id: DeckId) -> Result<usize, StoreError> {
        self.with_conn(move |conn| {
            count(conn, "select count(*) from cards where deck_id = ?1", deck_id)
        })
        .await
    }

    async fn known_card_count(&self, deck_id: DeckId) -> Result<usize, StoreError> {
        self.with_conn(move |conn| {
            count(
                conn,
                "select count(*) from cards where deck_id = ?1 and is_known = 1",
                deck_id,
            )
        })
        .await
    }

    async fn unknown_cards(&self, deck_id: DeckId) -> Result<Vec<Card>, StoreError> {
        self.with_conn(move |conn| {
            let sql = format!(
                "select {CARD_COLUMNS} from cards where deck_id = ?1 and is_known = 0 order by created_at desc, id desc"
            );
            query_cards(conn, &sql, params![deck_id.0])
        })
        .await
    }

    async fn card_by_id(&self, card_id: CardId) -> Result<Option<Card>, StoreError> {
        self.with_conn(move |conn| {
            let sql = format!("select {CARD_COLUMNS} from cards where id = ?1");
            conn.query_row(&sql, params![card_id.0], card_from_row)
                .optional()
                .map_err(persistence)
        })
        .await
    }

    #[instrument(skip(self, card), fields(deck = %card.deck_id()))]
    async fn insert_card(&self, card: NewCard) -> Result<Card, StoreError> {
        self.with_conn(move |conn| {
            let deck_id = card.deck_id();
            if select_deck(conn, deck_id)?.is_none() {
                return Err(StoreError::deck_not_found(deck_id));
            }
            let now = Utc::now();
            conn.execute(
                "insert into cards (deck_id, word, translation, is_known, last_reviewed_at, created_at, updated_at) \
                 values (?1, ?2, ?3, 0, null, ?4, ?4)",
                params![deck_id.0, card.word(), card.translation(), timestamp(now)],
            )
            .map_err(persistence)?;
            let id = CardId(conn.last_insert_rowid());
            Ok(card.into_card(id, now))
        })
        .await
    }

    async fn update_card(&self, card: &Card) -> Result<(), StoreError> {
        let card = card.clone();
        self.with_conn(move |conn| {
            let changed = conn
                .execute(
                    "update cards set word = ?1, translation = ?2, is_known = ?3, \
                     last_reviewed_at = ?4, updated_at = ?5 where id = ?6",
                    params![
                        card.word,
                        card.translation,
                        card.is_known,
                        card.last_reviewed_at.map(timestamp),
                        timestamp(Utc::now()),
                        card.id.0
                    ],
                )
                .map_err(persistence)?;
            if changed == 0 {
                return Err(StoreError::card_not_found(card.id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_card(&self, card_id: CardId) -> Result<(), StoreError> {
        self.with_conn(move |conn| {
            let changed = conn
                .execute("delete from cards where id = ?1", params![card_id.0])
                .map_err(persistence)?;
            if changed == 0 {
                return Err(StoreError::card_not_found(card_id));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl DeckStore for SqliteStore {
    async fn deck_by_id(&self, deck_id: DeckId) -> Result<Option<Deck>, StoreError> {
        self.with_conn(move |conn| select_deck(conn, deck_id)).await
    }

    async fn all_decks(&self) -> Result<Vec<Deck>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "select id, name, created_at, updated_at from decks order by updated_at desc, id desc",
                )
                .map_err(persistence)?;
            let rows = stmt.query_map([], deck_from_row).map_err(persistence)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(persistence)
        })
        .await
    }

    #[instrument(skip(self, deck), fields(name = deck.name()))]
    async fn insert_deck(&self, deck: NewDeck) -> Result<Deck, StoreError> {
        self.with_conn(move |conn| {
            let now = Utc::now();
            conn.execute(
                "insert into decks (name, created_at, updated_at) values (?1, ?2, ?2)",
                params![deck.name(), timestamp(now)],
            )
            .map_err(persistence)?;
            Ok(Deck {
                id: DeckId(conn.last_insert_rowid()),
                name: deck.name().to_string(),
                created_at: now,
                updated_at: now,
            })
        })
        .await
    }

    async fn rename_deck(&self, deck_id: DeckId, deck: NewDeck) -> Result<Deck, StoreError> {
        self.with_conn(move |conn| {
            let changed = conn
                .execute(
                    "update decks set name = ?1, updated_at = ?2 where id = ?3",
                    params![deck.name(), timestamp(Utc::now()), deck_id.0],
                )
                .map_err(persistence)?;
            if changed == 0 {
                return Err(StoreError::deck_not_found(deck_id));
            }
            select_deck(conn, deck_id)?.ok_or_else(|| StoreError::deck_not_found(deck_id))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete_deck(&self, deck_id: DeckId) -> Result<(), StoreError> {
        self.with_conn(move |conn| {
            let changed = conn
                .execute("delete from decks where id = ?1", params![deck_id.0])
                .map_err(persistence)?;
            if changed == 0 {
                return Err(StoreError::deck_not_found(deck_id));
            }
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn seeded() -> (SqliteStore, Deck) {
        let store = SqliteStore::open_in_memory().unwrap();
        let deck = store
            .insert_deck(NewDeck::new("Spanish").unwrap())
            .await
            .unwrap();
        for (word, translation) in [("perro", "dog"), ("gato", "cat"), ("casa", "house")] {
            store
                .insert_card(NewCard::new(deck.id, word, translation).unwrap())
                .await
                .unwrap();
        }
        (store, deck)
    }

    #[tokio::test]
    async fn cards_newest_first() {
        let (store, deck) = seeded().await;
        let cards = store.cards_for_deck(deck.id).await.unwrap();
        let words: Vec<&str> = cards.iter().map(|c| c.word.as_str()).collect();
        assert_eq!(words, vec!["casa", "gato", "perro"]);
        assert!(cards.iter().all(|c| !c.is_known && c.last_reviewed_at.is_none()));
    }

    #[tokio::test]
    async fn random_excluding_never_returns_excluded() {
        let (store, deck) = seeded().await;
        let cards = store.cards_for_deck(deck.id).await.unwrap();
        let excluded = cards[0].id;
        for _ in 0..20 {
            let sample = store
                .random_cards_excluding(deck.id, excluded, 3)
                .await
                .unwrap();
            assert_eq!(sample.len(), 2);
            assert!(sample.iter().all(|c| c.id != excluded));
            let ids: HashSet<CardId> = sample.iter().map(|c| c.id).collect();
            assert_eq!(ids.len(), sample.len());
        }
    }

    #[tokio::test]
    async fn random_cards_respects_limit() {
        let (store, deck) = seeded().await;
        assert_eq!(store.random_cards(deck.id, 2).await.unwrap().len(), 2);
        assert_eq!(store.random_cards(deck.id, 10).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn status_write_persists_and_counts() {
        let (store, deck) = seeded().await;
        let card = store.cards_for_deck(deck.id).await.unwrap()[0].clone();
        let at = Utc::now();

        store.set_known_status(card.id, true, at).await.unwrap();

        let reloaded = store.card_by_id(card.id).await.unwrap().unwrap();
        assert!(reloaded.is_known);
        let stored = reloaded.last_reviewed_at.unwrap();
        assert!((stored - at).num_milliseconds().abs() < 1);
        assert_eq!(store.card_count(deck.id).await.unwrap(), 3);
        assert_eq!(store.known_card_count(deck.id).await.unwrap(), 1);
        assert_eq!(store.unknown_cards(deck.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn status_write_on_missing_card_is_not_found() {
        let (store, _) = seeded().await;
        let err = store
            .set_known_status(CardId(999), true, Utc::now())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn insert_into_missing_deck_is_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store
            .insert_card(NewCard::new(DeckId(7), "a", "b").unwrap())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn update_card_rewrites_fields() {
        let (store, deck) = seeded().await;
        let card = store.cards_for_deck(deck.id).await.unwrap()[0].clone();
        let edited = card.edited("la casa", "the house").unwrap();
        store.update_card(&edited).await.unwrap();

        let reloaded = store.card_by_id(card.id).await.unwrap().unwrap();
        assert_eq!(reloaded.word, "la casa");
        assert_eq!(reloaded.translation, "the house");
        assert!(reloaded.updated_at >= card.updated_at);
    }

    #[tokio::test]
    async fn deleting_deck_cascades_to_cards() {
        let (store, deck) = seeded().await;
        let card = store.cards_for_deck(deck.id).await.unwrap()[0].clone();

        store.delete_deck(deck.id).await.unwrap();

        assert!(store.deck_by_id(deck.id).await.unwrap().is_none());
        assert!(store.card_by_id(card.id).await.unwrap().is_none());
        assert_eq!(store.card_count(deck.id).await.unwrap(), 0);
        assert!(store.delete_deck(deck.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn rename_bumps_deck_to_front() {
        let store = SqliteStore::open_in_memory().unwrap();
        let first = store.insert_deck(NewDeck::new("First").unwrap()).await.unwrap();
        let second = store.insert_deck(NewDeck::new("Second").unwrap()).await.unwrap();

        let decks = store.all_decks().await.unwrap();
        assert_eq!(decks[0].id, second.id);

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let renamed = store
            .rename_deck(first.id, NewDeck::new("Renamed").unwrap())
            .await
            .unwrap();
        assert_eq!(renamed.name, "Renamed");

        let decks = store.all_decks().await.unwrap();
        assert_eq!(decks[0].id, first.id);
        assert_eq!(decks[0].name, "Renamed");
    }

    #[tokio::test]
    async fn reopening_file_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexideck.db");
        let deck_id = {
            let store = SqliteStore::open(&path).unwrap();
            let deck = store.insert_deck(NewDeck::new("Kept").unwrap()).await.unwrap();
            store
                .insert_card(NewCard::new(deck.id, "uno", "one").unwrap())
                .await
                .unwrap();
            deck.id
        };

        let store = SqliteStore::open(&path).unwrap();
        let deck = store.deck_by_id(deck_id).await.unwrap().unwrap();
        assert_eq!(deck.name, "Kept");
        assert_eq!(store.card_count(deck_id).await.unwrap(), 1);
    }
}
