//! Call id generation
//!
//! Call and response ids come from one shared counter so that they form a
//! single total order of "things that happened" in program order. The
//! synthesis engine relies on that order to tell synchronous calls from
//! asynchronous ones.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Linearizable fetch-and-increment counter handed to the emission path
///
/// Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct CallIdGenerator {
    counter: Arc<AtomicU64>,
}

impl CallIdGenerator {
    /// Counter whose first id is 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter whose first id is `first`
    pub fn starting_at(first: u64) -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(first.saturating_sub(1))),
        }
    }

    /// Take the next id
    pub fn next_id(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The most recently issued id (0 if none)
    pub fn current(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.counter.store(0, Ordering::SeqCst);
    }
}
