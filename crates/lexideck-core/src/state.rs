//! Observable session state.
//!
//! Each session owns one `StateStore`. Callers read snapshots or subscribe to
//! changes; only the owning session can mutate.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Lifecycle of a study or quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Created, cards not yet handed over.
    Loading,
    /// Cursor is moving through the working set.
    Active,
    /// Working set exhausted. Terminal.
    Complete,
    /// Nothing to run (quiz with no cards, failed load). Terminal; `error` says why.
    Unavailable,
}

impl SessionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionPhase::Complete | SessionPhase::Unavailable)
    }
}

/// Single-writer state container with change notification.
#[derive(Debug)]
pub struct StateStore<S> {
    tx: watch::Sender<S>,
}

impl<S: Clone> StateStore<S> {
    pub fn new(initial: S) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Snapshot of the current state.
    pub fn current(&self) -> S {
        self.tx.borrow().clone()
    }

    /// Receiver that is notified after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }

    pub(crate) fn update(&self, f: impl FnOnce(&mut S)) {
        self.tx.send_modify(f);
    }

    /// Read a projection without cloning the whole state.
    pub(crate) fn read<T>(&self, f: impl FnOnce(&S) -> T) -> T {
        f(&self.tx.borrow())
    }
}
