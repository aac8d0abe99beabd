//! State store
//!
//! Holds the single current `RunState` and notifies subscribers of every
//! mutation. Built on `tokio::sync::watch`: `send_modify` applies a mutation
//! and wakes readers in one step, so a reader can never observe a partially
//! updated state — it either sees the snapshot before a mutation or the one
//! after it.

use tokio::sync::watch;

use crate::state::RunState;

pub struct StateStore {
    tx: watch::Sender<RunState>,
}

impl StateStore {
    pub fn new(initial: RunState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Apply one atomic mutation and notify all subscribers.
    pub fn update(&self, mutate: impl FnOnce(&mut RunState)) {
        self.tx.send_modify(mutate);
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> RunState {
        self.tx.borrow().clone()
    }

    /// Read-only subscription; receivers see complete snapshots only.
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.tx.subscribe()
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("status", &self.tx.borrow().status)
            .finish()
    }
}
