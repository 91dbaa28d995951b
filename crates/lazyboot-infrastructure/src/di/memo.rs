//! Memoized shared futures
//!
//! [`Memo`] is the single primitive behind every "at most once" guarantee in
//! this crate: singleton providers, container initialization, lazy module
//! loads and the bootstrap slot.
//!
//! The first caller installs the initialization future; every caller (the
//! first included) awaits a clone of the same [`Shared`] future. Dropping a
//! caller never cancels the initialization, so a cancelled first invocation
//! cannot cause the initializer to run a second time.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Observable phase of a [`Memo`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoPhase {
    /// Nobody asked for the value yet
    Empty,
    /// Initialization future installed and not yet complete
    Pending,
    /// Value available
    Settled,
}

enum MemoState<T: Clone> {
    Empty,
    Pending(Shared<BoxFuture<'static, T>>),
    Settled(T),
}

/// Memoized, shared asynchronous value
pub struct Memo<T: Clone> {
    state: Mutex<MemoState<T>>,
}

impl<T> Memo<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an empty memo
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoState::Empty),
        }
    }

    /// Return the memoized value, running `init` only if no initialization was ever started
    pub async fn get_or_init<F, Fut>(&self, init: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let pending = {
            let mut state = self.lock();
            match &*state {
                MemoState::Settled(value) => return value.clone(),
                MemoState::Pending(pending) => pending.clone(),
                MemoState::Empty => {
                    let pending = init().boxed().shared();
                    *state = MemoState::Pending(pending.clone());
                    pending
                }
            }
        };

        let value = pending.await;
        self.settle(&value);
        value
    }

    /// Settled value, if initialization completed
    pub fn get(&self) -> Option<T> {
        match &*self.lock() {
            MemoState::Settled(value) => Some(value.clone()),
            MemoState::Pending(pending) => pending.peek().cloned(),
            MemoState::Empty => None,
        }
    }

    /// Current phase
    pub fn phase(&self) -> MemoPhase {
        match &*self.lock() {
            MemoState::Empty => MemoPhase::Empty,
            MemoState::Pending(pending) if pending.peek().is_none() => MemoPhase::Pending,
            MemoState::Pending(_) | MemoState::Settled(_) => MemoPhase::Settled,
        }
    }

    fn settle(&self, value: &T) {
        let mut state = self.lock();
        if matches!(*state, MemoState::Pending(_)) {
            *state = MemoState::Settled(value.clone());
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for Memo<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
