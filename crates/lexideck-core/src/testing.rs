//! In-crate store double for session and overview tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::StoreError;
use crate::model::{Card, CardId, Deck, DeckId, NewCard, NewDeck};
use crate::traits::{CardStore, DeckStore};

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

pub fn deck(id: i64) -> Deck {
    Deck {
        id: DeckId(id),
        name: format!("Deck {id}"),
        created_at: at(0),
        updated_at: at(id),
    }
}

pub fn card(id: i64, deck_id: i64, word: &str, translation: &str) -> Card {
    Card {
        id: CardId(id),
        deck_id: DeckId(deck_id),
        word: word.to_string(),
        translation: translation.to_string(),
        is_known: false,
        last_reviewed_at: None,
        created_at: at(id),
        updated_at: at(id),
    }
}

pub struct VecStore {
    cards: Mutex<Vec<Card>>,
    decks: Mutex<Vec<Deck>>,
    rng: Mutex<StdRng>,
    fail_writes: AtomicBool,
    fail_sampling: AtomicBool,
    status_writes: AtomicUsize,
    sample_calls: AtomicUsize,
}

impl VecStore {
    pub fn new(cards: Vec<Card>) -> Self {
        Self {
            cards: Mutex::new(cards),
            decks: Mutex::new(Vec::new()),
            rng: Mutex::new(StdRng::seed_from_u64(0)),
            fail_writes: AtomicBool::new(false),
            fail_sampling: AtomicBool::new(false),
            status_writes: AtomicUsize::new(0),
            sample_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        *self.rng.lock().unwrap() = StdRng::seed_from_u64(seed);
        self
    }

    pub fn add_deck(&self, deck: Deck) {
        self.decks.lock().unwrap().push(deck);
    }

    pub fn snapshot(&self) -> Vec<Card> {
        self.cards.lock().unwrap().clone()
    }

    pub fn get(&self, id: CardId) -> Option<Card> {
        self.cards.lock().unwrap().iter().find(|c| c.id == id).cloned()
    }

    pub fn fail_status_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    pub fn fail_sampling(&self, fail: bool) {
        self.fail_sampling.store(fail, Ordering::Relaxed);
    }

    pub fn status_writes(&self) -> usize {
        self.status_writes.load(Ordering::Relaxed)
    }

    pub fn sample_calls(&self) -> usize {
        self.sample_calls.load(Ordering::Relaxed)
    }

    fn in_deck(&self, deck_id: DeckId) -> Vec<Card> {
        self.cards
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.deck_id == deck_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CardStore for VecStore {
    async fn cards_for_deck(&self, deck_id: DeckId) -> Result<Vec<Card>, StoreError> {
        Ok(self.in_deck(deck_id))
    }

    async fn random_cards_excluding(
        &self,
        deck_id: DeckId,
        exclude_id: CardId,
        limit: usize,
    ) -> Result<Vec<Card>, StoreError> {
        self.sample_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_sampling.load(Ordering::Relaxed) {
            return Err(StoreError::Persistence("sampling disabled".into()));
        }
        let mut pool: Vec<Card> = self
            .in_deck(deck_id)
            .into_iter()
            .filter(|c| c.id != exclude_id)
            .collect();
        pool.shuffle(&mut *self.rng.lock().unwrap());
        pool.truncate(limit);
        Ok(pool)
    }

    async fn set_known_status(
        &self,
        card_id: CardId,
        is_known: bool,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.status_writes.fetch_add(1, Ordering::Relaxed);
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Persistence("disk full".into()));
        }
        let mut cards = self.cards.lock().unwrap();
        let card = cards
            .iter_mut()
            .find(|c| c.id == card_id)
            .ok_or_else(|| StoreError::card_not_found(card_id))?;
        card.is_known = is_known;
        card.last_reviewed_at = Some(at);
        Ok(())
    }

    async fn card_count(&self, deck_id: DeckId) -> Result<usize, StoreError> {
        Ok(self.in_deck(deck_id).len())
    }

    async fn known_card_count(&self, deck_id: DeckId) -> Result<usize, StoreError> {
        Ok(self.in_deck(deck_id).iter().filter(|c| c.is_known).count())
    }

    // Sessions only read and mark cards.

    async fn random_cards(&self, _: DeckId, _: usize) -> Result<Vec<Card>, StoreError> {
        unimplemented!()
    }

    async fn unknown_cards(&self, _: DeckId) -> Result<Vec<Card>, StoreError> {
        unimplemented!()
    }

    async fn card_by_id(&self, _: CardId) -> Result<Option<Card>, StoreError> {
        unimplemented!()
    }

    async fn insert_card(&self, _: NewCard) -> Result<Card, StoreError> {
        unimplemented!()
    }

    async fn update_card(&self, _: &Card) -> Result<(), StoreError> {
        unimplemented!()
    }

    async fn delete_card(&self, _: CardId) -> Result<(), StoreError> {
        unimplemented!()
    }
}

#[async_trait]
impl DeckStore for VecStore {
    async fn deck_by_id(&self, deck_id: DeckId) -> Result<Option<Deck>, StoreError> {
        Ok(self
            .decks
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == deck_id)
            .cloned())
    }

    async fn all_decks(&self) -> Result<Vec<Deck>, StoreError> {
        let mut decks = self.decks.lock().unwrap().clone();
        decks.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(decks)
    }

    async fn insert_deck(&self, _: NewDeck) -> Result<Deck, StoreError> {
        unimplemented!()
    }

    async fn rename_deck(&self, _: DeckId, _: NewDeck) -> Result<Deck, StoreError> {
        unimplemented!()
    }

    async fn delete_deck(&self, _: DeckId) -> Result<(), StoreError> {
        unimplemented!()
    }
}
