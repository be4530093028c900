//! Multiple-choice quiz sessions.
//!
//! Every card of the deck becomes one question whose options are the card's
//! own translation plus up to three decoy translations sampled from the rest
//! of the deck. The question list is fixed when the quiz starts.

use std::sync::Arc;

use futures::future::join_all;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Card, Deck, DeckId};
use crate::state::{SessionPhase, StateStore};
use crate::traits::{CardStore, DeckStore};

/// Decoys requested per question.
pub const DISTRACTOR_LIMIT: usize = 3;

/// Error shown when a quiz is started on an empty deck.
pub const NO_CARDS_MESSAGE: &str = "no cards available for quiz";

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub card: Card,
    /// Shuffled; contains `card.translation` exactly once.
    pub options: Vec<String>,
}

impl QuizQuestion {
    /// Build a question from the decoy cards the store returned.
    ///
    /// Decoy translations are deduplicated and never repeat the correct
    /// answer, so a deck with shared translations yields fewer options.
    pub fn build<R: Rng + ?Sized>(card: Card, decoys: Vec<Card>, rng: &mut R) -> Self {
        let mut options: Vec<String> = Vec::with_capacity(DISTRACTOR_LIMIT + 1);
        for decoy in decoys {
            if decoy.id == card.id || decoy.translation == card.translation {
                continue;
            }
            if !options.contains(&decoy.translation) {
                options.push(decoy.translation);
            }
        }
        options.truncate(DISTRACTOR_LIMIT);
        options.push(card.translation.clone());
        options.shuffle(rng);
        Self { card, options }
    }

    /// Exact, case- and whitespace-sensitive comparison with the translation.
    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.card.translation
    }
}

/// Everything a caller needs to render a quiz.
#[derive(Debug, Clone)]
pub struct QuizState {
    pub deck: Option<Deck>,
    pub phase: SessionPhase,
    pub questions: Arc<[QuizQuestion]>,
    pub cursor: usize,
    pub selected_answer: Option<String>,
    pub has_answered: bool,
    pub correct_count: usize,
    pub answered_count: usize,
    pub error: Option<String>,
}

impl Default for QuizState {
    fn default() -> Self {
        Self {
            deck: None,
            phase: SessionPhase::Loading,
            questions: Arc::from(Vec::new()),
            cursor: 0,
            selected_answer: None,
            has_answered: false,
            correct_count: 0,
            answered_count: 0,
            error: None,
        }
    }
}

impl QuizState {
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        if self.phase != SessionPhase::Active {
            return None;
        }
        self.questions.get(self.cursor)
    }

    /// Whether the selected answer for the current question was right.
    pub fn selection_correct(&self) -> Option<bool> {
        let question = self.current_question()?;
        self.selected_answer
            .as_deref()
            .map(|answer| question.is_correct(answer))
    }

    /// `correct_count / answered_count`, or 0 before any question is done.
    pub fn score(&self) -> f64 {
        if self.answered_count == 0 {
            0.0
        } else {
            self.correct_count as f64 / self.answered_count as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::Complete
    }
}

/// One pass of multiple-choice self-testing over a deck.
pub struct QuizSession {
    id: Uuid,
    state: StateStore<QuizState>,
}

impl QuizSession {
    /// Build the question list and start the quiz.
    ///
    /// With no cards the quiz is `Unavailable` rather than complete. A failed
    /// decoy query also leaves it `Unavailable`, with the store error attached.
    pub async fn start<R: Rng + ?Sized>(
        deck: Deck,
        cards: Vec<Card>,
        distractors: &dyn CardStore,
        rng: &mut R,
    ) -> Self {
        let id = Uuid::new_v4();

        if cards.is_empty() {
            tracing::debug!(session = %id, deck = %deck.id, "quiz has no cards");
            return Self::unavailable(id, deck, NO_CARDS_MESSAGE.to_string());
        }

        let mut order = cards;
        order.shuffle(rng);

        let deck_id = deck.id;
        let fetched = join_all(order.iter().map(|card| {
            distractors.random_cards_excluding(deck_id, card.id, DISTRACTOR_LIMIT)
        }))
        .await;

        let mut questions = Vec::with_capacity(order.len());
        for (card, decoys) in order.into_iter().zip(fetched) {
            match decoys {
                Ok(decoys) => questions.push(QuizQuestion::build(card, decoys, rng)),
                Err(e) => {
                    tracing::warn!(session = %id, card = %card.id, "failed to fetch decoys: {e}");
                    return Self::unavailable(id, deck, e.to_string());
                }
            }
        }

        tracing::debug!(session = %id, deck = %deck_id, questions = questions.len(), "quiz started");
        let state = QuizState {
            deck: Some(deck),
            phase: SessionPhase::Active,
            questions: Arc::from(questions),
            ..QuizState::default()
        };
        Self {
            id,
            state: StateStore::new(state),
        }
    }

    /// Load the deck and its cards once, then start.
    ///
    /// A missing deck degrades to a placeholder with the error attached.
    pub async fn open<R: Rng + ?Sized>(
        deck_id: DeckId,
        decks: &dyn DeckStore,
        cards: &dyn CardStore,
        rng: &mut R,
    ) -> Self {
        let (deck, deck_error) = match decks.deck_by_id(deck_id).await {
            Ok(Some(deck)) => (deck, None),
            Ok(None) => {
                tracing::warn!(deck = %deck_id, "deck not found, using placeholder");
                (
                    Deck::placeholder(deck_id),
                    Some(format!("deck {deck_id} not found")),
                )
            }
            Err(e) => (Deck::placeholder(deck_id), Some(e.to_string())),
        };

        let snapshot = match cards.cards_for_deck(deck_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(deck = %deck_id, "failed to load cards: {e}");
                return Self::unavailable(Uuid::new_v4(), deck, e.to_string());
            }
        };

        let session = Self::start(deck, snapshot, cards, rng).await;
        if let Some(message) = deck_error {
            session.state.update(|s| {
                s.error = Some(match s.error.take() {
                    Some(existing) => format!("{message}; {existing}"),
                    None => message,
                })
            });
        }
        session
    }

    fn unavailable(id: Uuid, deck: Deck, error: String) -> Self {
        let state = QuizState {
            deck: Some(deck),
            phase: SessionPhase::Unavailable,
            error: Some(error),
            ..QuizState::default()
        };
        Self {
            id,
            state: StateStore::new(state),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> QuizState {
        self.state.current()
    }

    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<QuizState> {
        self.state.subscribe()
    }

    pub fn current_question(&self) -> Option<QuizQuestion> {
        self.state.read(|s| s.current_question().cloned())
    }

    /// Answer the current question. Only the first answer counts.
    pub fn select_answer(&mut self, answer: &str) {
        self.state.update(|s| {
            if s.has_answered {
                return;
            }
            let Some(question) = s.current_question() else {
                return;
            };
            let correct = question.is_correct(answer);
            s.selected_answer = Some(answer.to_string());
            s.has_answered = true;
            if correct {
                s.correct_count += 1;
            }
        });
    }

    /// Move to the next question, or complete the quiz after the last one.
    pub fn next(&mut self) {
        let id = self.id;
        self.state.update(|s| {
            if s.phase != SessionPhase::Active {
                return;
            }
            s.cursor += 1;
            s.answered_count += 1;
            if s.cursor < s.questions.len() {
                s.selected_answer = None;
                s.has_answered = false;
            } else {
                s.phase = SessionPhase::Complete;
                tracing::debug!(session = %id, correct = s.correct_count, answered = s.answered_count, "quiz complete");
            }
        });
    }

    pub fn clear_error(&mut self) {
        self.state.update(|s| s.error = None);
    }
}
