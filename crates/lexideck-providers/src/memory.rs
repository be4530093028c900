//! In-memory store for testing sessions without a database.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

use lexideck_core::error::StoreError;
use lexideck_core::model::{Card, CardId, Deck, DeckId, NewCard, NewDeck};
use lexideck_core::traits::{CardStore, DeckStore};

/// A `CardStore` + `DeckStore` kept entirely in memory.
///
/// Sampling draws from a seedable RNG so tests get a stable order. Status
/// writes can be made to fail on demand.
pub struct MemoryStore {
    decks: Mutex<BTreeMap<DeckId, Deck>>,
    cards: Mutex<BTreeMap<CardId, Card>>,
    next_id: Mutex<i64>,
    rng: Mutex<StdRng>,
    fail_status_writes: AtomicBool,
    status_writes: AtomicU32,
    sample_calls: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    /// Create an empty store whose sampling RNG starts from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            decks: Mutex::new(BTreeMap::new()),
            cards: Mutex::new(BTreeMap::new()),
            next_id: Mutex::new(1),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            fail_status_writes: AtomicBool::new(false),
            status_writes: AtomicU32::new(0),
            sample_calls: AtomicU32::new(0),
        }
    }

    /// Make subsequent `set_known_status` calls fail (or succeed again).
    pub fn fail_status_writes(&self, fail: bool) {
        self.fail_status_writes.store(fail, Ordering::Relaxed);
    }

    /// Number of `set_known_status` calls, failed ones included.
    pub fn status_writes(&self) -> u32 {
        self.status_writes.load(Ordering::Relaxed)
    }

    /// Number of random sampling calls.
    pub fn sample_calls(&self) -> u32 {
        self.sample_calls.load(Ordering::Relaxed)
    }

    fn allocate_id(&self) -> i64 {
        let mut next = self.next_id.lock().unwrap();
        let id = *next;
        *next += 1;
        id
    }

    fn deck_cards(&self, deck_id: DeckId) -> Vec<Card> {
        let mut cards: Vec<Card> = self
            .cards
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.deck_id == deck_id)
            .cloned()
            .collect();
        cards.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        cards
    }

    fn sample(&self, pool: Vec<Card>, limit: usize) -> Vec<Card> {
        self.sample_calls.fetch_add(1, Ordering::Relaxed);
        let mut rng = self.rng.lock().unwrap();
        pool.choose_multiple(&mut *rng, limit).cloned().collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CardStore for MemoryStore {
    async fn cards_for_deck(&self, deck_id: DeckId) -> Result<Vec<Card>, StoreError> {
        Ok(self.deck_cards(deck_id))
    }

    async fn random_cards_excluding(
        &self,
        deck_id: DeckId,
        exclude_id: CardId,
        limit: usize,
    ) -> Result<Vec<Card>, StoreError> {
        let pool = self
            .deck_cards(deck_id)
            .into_iter()
            .filter(|c| c.id != exclude_id)
            .collect();
        Ok(self.sample(pool, limit))
    }

    async fn random_cards(&self, deck_id: DeckId, limit: usize) -> Result<Vec<Card>, StoreError> {
        Ok(self.sample(self.deck_cards(deck_id), limit))
    }

    async fn set_known_status(
        &self,
        card_id: CardId,
        is_known: bool,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.status_writes.fetch_add(1, Ordering::Relaxed);
        if self.fail_status_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Persistence("status writes disabled".into()));
        }
        let mut cards = self.cards.lock().unwrap();
        let card = cards
            .get_mut(&card_id)
            .ok_or_else(|| StoreError::card_not_found(card_id))?;
        card.is_known = is_known;
        card.last_reviewed_at = Some(at);
        Ok(())
    }

    async fn card_count(&self, deck_id: DeckId) -> Result<usize, StoreError> {
        Ok(self.deck_cards(deck_id).len())
    }

    async fn known_card_count(&self, deck_id: DeckId) -> Result<usize, StoreError> {
        Ok(self.deck_cards(deck_id).iter().filter(|c| c.is_known).count())
    }

    async fn unknown_cards(&self, deck_id: DeckId) -> Result<Vec<Card>, StoreError> {
        let mut cards = self.deck_cards(deck_id);
        cards.retain(|c| !c.is_known);
        Ok(cards)
    }

    async fn card_by_id(&self, card_id: CardId) -> Result<Option<Card>, StoreError> {
        Ok(self.cards.lock().unwrap().get(&card_id).cloned())
    }

    async fn insert_card(&self, card: NewCard) -> Result<Card, StoreError> {
        if !self.decks.lock().unwrap().contains_key(&card.deck_id()) {
            return Err(StoreError::deck_not_found(card.deck_id()));
        }
        let card = card.into_card(CardId(self.allocate_id()), Utc::now());
        self.cards.lock().unwrap().insert(card.id, card.clone());
        Ok(card)
    }

    async fn update_card(&self, card: &Card) -> Result<(), StoreError> {
        let mut cards = self.cards.lock().unwrap();
        let slot = cards
            .get_mut(&card.id)
            .ok_or_else(|| StoreError::card_not_found(card.id))?;
        *slot = Card {
            updated_at: Utc::now(),
            ..card.clone()
        };
        Ok(())
    }

    async fn delete_card(&self, card_id: CardId) -> Result<(), StoreError> {
        self.cards
            .lock()
            .unwrap()
            .remove(&card_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::card_not_found(card_id))
    }
}

#[async_trait]
impl DeckStore for MemoryStore {
    async fn deck_by_id(&self, deck_id: DeckId) -> Result<Option<Deck>, StoreError> {
        Ok(self.decks.lock().unwrap().get(&deck_id).cloned())
    }

    async fn all_decks(&self) -> Result<Vec<Deck>, StoreError> {
        let mut decks: Vec<Deck> = self.decks.lock().unwrap().values().cloned().collect();
        decks.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(decks)
    }

    async fn insert_deck(&self, deck: NewDeck) -> Result<Deck, StoreError> {
        let now = Utc::now();
        let deck = Deck {
            id: DeckId(self.allocate_id()),
            name: deck.name().to_string(),
            created_at: now,
            updated_at: now,
        };
        self.decks.lock().unwrap().insert(deck.id, deck.clone());
        Ok(deck)
    }

    async fn rename_deck(&self, deck_id: DeckId, deck: NewDeck) -> Result<Deck, StoreError> {
        let mut decks = self.decks.lock().unwrap();
        let slot = decks
            .get_mut(&deck_id)
            .ok_or_else(|| StoreError::deck_not_found(deck_id))?;
        slot.name = deck.name().to_string();
        slot.updated_at = Utc::now();
        Ok(slot.clone())
    }

    async fn delete_deck(&self, deck_id: DeckId) -> Result<(), StoreError> {
        if self.decks.lock().unwrap().remove(&deck_id).is_none() {
            return Err(StoreError::deck_not_found(deck_id));
        }
        self.cards
            .lock()
            .unwrap()
            .retain(|_, c| c.deck_id != deck_id);
        Ok(())
    }
}
