//! Per-code invalidation epochs that keep stale cache fills out.
//!
//! A resolution that misses the cache reads from the store and then fills the
//! cache. If an update or deactivation lands between that read and the fill,
//! the fill would put the old record back after the writer's invalidation.
//!
//! Writers bump the epoch of a code after the store write and before the cache
//! invalidation. Readers take the epoch before fetching and only fill when it
//! is unchanged; after the fill they check once more and evict their own entry
//! if a writer bumped in between.
//!
//! Codes share a fixed set of slots, so memory stays constant. Two codes in the
//! same slot only cost an occasional skipped fill.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

const SLOTS: usize = 256;

/// Fixed table of invalidation counters, indexed by a hash of the code.
pub struct InvalidationEpochs {
    slots: Box<[AtomicU64]>,
}

impl InvalidationEpochs {
    pub fn new() -> Self {
        Self {
            slots: (0..SLOTS).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    /// Current epoch of the slot that holds `code`.
    pub fn current(&self, code: &str) -> u64 {
        self.slot(code).load(Ordering::SeqCst)
    }

    /// Marks every in-flight fill for `code` as stale.
    pub fn bump(&self, code: &str) {
        self.slot(code).fetch_add(1, Ordering::SeqCst);
    }

    fn slot(&self, code: &str) -> &AtomicU64 {
        let mut hasher = DefaultHasher::new();
        code.hash(&mut hasher);
        let index = (hasher.finish() % SLOTS as u64) as usize;
        &self.slots[index]
    }
}

impl Default for InvalidationEpochs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_changes_epoch() {
        let epochs = InvalidationEpochs::new();
        let before = epochs.current("abc1234");
        epochs.bump("abc1234");
        assert_ne!(epochs.current("abc1234"), before);
    }

    #[test]
    fn test_epoch_is_stable_without_writes() {
        let epochs = InvalidationEpochs::new();
        epochs.bump("other99");
        let first = epochs.current("abc1234");
        assert_eq!(epochs.current("abc1234"), first);
    }
}
