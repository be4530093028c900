//! Free-review study sessions.
//!
//! A session freezes a shuffled copy of the deck at start, shows one card at a
//! time, and records the learner's known/unknown verdicts. Status writes go to
//! the store in the background; the cursor never waits for them.

use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{Card, CardId, Deck, DeckId};
use crate::state::{SessionPhase, StateStore};
use crate::traits::{CardStore, DeckStore};

/// Everything a caller needs to render a study session.
#[derive(Debug, Clone)]
pub struct StudyState {
    pub deck: Option<Deck>,
    pub phase: SessionPhase,
    /// Frozen, shuffled snapshot of the deck's cards.
    pub working_set: Arc<[Card]>,
    pub cursor: usize,
    pub studied_count: usize,
    pub known_count: usize,
    pub showing_answer: bool,
    pub error: Option<String>,
}

impl Default for StudyState {
    fn default() -> Self {
        Self {
            deck: None,
            phase: SessionPhase::Loading,
            working_set: Arc::from(Vec::new()),
            cursor: 0,
            studied_count: 0,
            known_count: 0,
            showing_answer: false,
            error: None,
        }
    }
}

impl StudyState {
    pub fn current_card(&self) -> Option<&Card> {
        if self.phase != SessionPhase::Active {
            return None;
        }
        self.working_set.get(self.cursor)
    }

    pub fn remaining(&self) -> usize {
        self.working_set.len().saturating_sub(self.cursor)
    }

    /// `known_count / studied_count`, or 0 before anything was studied.
    pub fn accuracy(&self) -> f64 {
        if self.studied_count == 0 {
            0.0
        } else {
            self.known_count as f64 / self.studied_count as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::Complete
    }
}

/// One pass of free review over a deck.
pub struct StudySession {
    id: Uuid,
    state: Arc<StateStore<StudyState>>,
    store: Arc<dyn CardStore>,
    pending: Vec<JoinHandle<()>>,
}

impl StudySession {
    /// Start a session over a snapshot of `cards`.
    ///
    /// An empty snapshot yields a session that is already complete at 0/0.
    pub fn start<R: Rng + ?Sized>(
        deck: Deck,
        cards: Vec<Card>,
        store: Arc<dyn CardStore>,
        rng: &mut R,
    ) -> Self {
        let mut working_set = cards;
        working_set.shuffle(rng);

        let id = Uuid::new_v4();
        let phase = if working_set.is_empty() {
            SessionPhase::Complete
        } else {
            SessionPhase::Active
        };
        tracing::debug!(session = %id, deck = %deck.id, cards = working_set.len(), "study session started");

        let state = StudyState {
            deck: Some(deck),
            phase,
            working_set: Arc::from(working_set),
            ..StudyState::default()
        };

        Self {
            id,
            state: Arc::new(StateStore::new(state)),
            store,
            pending: Vec::new(),
        }
    }

    /// Load the deck and its cards once, then start.
    ///
    /// A missing deck is replaced by a placeholder and reported in `error`; a
    /// failed card fetch starts an empty (complete) session with the error set.
    pub async fn open<R: Rng + ?Sized>(
        deck_id: DeckId,
        decks: &dyn DeckStore,
        store: Arc<dyn CardStore>,
        rng: &mut R,
    ) -> Self {
        let mut errors = Vec::new();

        let deck = match decks.deck_by_id(deck_id).await {
            Ok(Some(deck)) => deck,
            Ok(None) => {
                tracing::warn!(deck = %deck_id, "deck not found, using placeholder");
                errors.push(format!("deck {deck_id} not found"));
                Deck::placeholder(deck_id)
            }
            Err(e) => {
                tracing::warn!(deck = %deck_id, "failed to load deck: {e}");
                errors.push(e.to_string());
                Deck::placeholder(deck_id)
            }
        };

        let cards = match store.cards_for_deck(deck_id).await {
            Ok(cards) => cards,
            Err(e) => {
                tracing::warn!(deck = %deck_id, "failed to load cards: {e}");
                errors.push(e.to_string());
                Vec::new()
            }
        };

        let session = Self::start(deck, cards, store, rng);
        if !errors.is_empty() {
            session.state.update(|s| s.error = Some(errors.join("; ")));
        }
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> StudyState {
        self.state.current()
    }

    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<StudyState> {
        self.state.subscribe()
    }

    pub fn current_card(&self) -> Option<Card> {
        self.state.read(|s| s.current_card().cloned())
    }

    /// Show the current card's translation. Idempotent.
    pub fn reveal(&mut self) {
        self.state.update(|s| {
            if s.phase == SessionPhase::Active {
                s.showing_answer = true;
            }
        });
    }

    /// Record a verdict for the current card and move on.
    ///
    /// Does nothing once the working set is exhausted. The status write is
    /// spawned on the current Tokio runtime; without one it is skipped and
    /// reported through `error`.
    pub fn mark(&mut self, is_known: bool) {
        let Some(card_id) = self.state.read(|s| s.current_card().map(|c| c.id)) else {
            tracing::debug!(session = %self.id, "mark ignored, no current card");
            return;
        };

        self.persist(card_id, is_known, Utc::now());

        self.state.update(|s| {
            s.cursor += 1;
            s.studied_count += 1;
            if is_known {
                s.known_count += 1;
            }
            s.showing_answer = false;
            if s.cursor >= s.working_set.len() {
                s.phase = SessionPhase::Complete;
            }
        });

        self.pending.retain(|h| !h.is_finished());
    }

    pub fn clear_error(&mut self) {
        self.state.update(|s| s.error = None);
    }

    /// Wait for every status write issued so far.
    pub async fn flush(&mut self) {
        for handle in self.pending.drain(..) {
            if let Err(e) = handle.await {
                tracing::warn!(session = %self.id, "status write task failed: {e}");
            }
        }
    }

    fn persist(&mut self, card_id: CardId, is_known: bool, at: DateTime<Utc>) {
        let store = Arc::clone(&self.store);
        let state: Weak<StateStore<StudyState>> = Arc::downgrade(&self.state);
        let session = self.id;

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            let e = StoreError::Persistence("no async runtime".into());
            tracing::warn!(%session, card = %card_id, "failed to save review: {e}");
            self.state
                .update(|s| s.error = Some(format!("failed to save review: {e}")));
            return;
        };

        self.pending.push(runtime.spawn(async move {
            let result = store.set_known_status(card_id, is_known, at).await;
            let Err(e) = result else {
                return;
            };
            match state.upgrade() {
                Some(state) => {
                    tracing::warn!(%session, card = %card_id, "failed to save review: {e}");
                    state.update(|s| s.error = Some(format!("failed to save review: {e}")));
                }
                None => {
                    tracing::debug!(%session, card = %card_id, "session gone, dropping write error: {e}");
                }
            }
        }));
    }
}
