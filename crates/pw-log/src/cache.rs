use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{LogError, LogResult};

/// Number of lines a cache holds when no capacity is given.
pub const DEFAULT_CAPACITY: usize = 200;

/// A fixed-size ring buffer that many threads may write into at once.
///
/// Once full, each insert overwrites the oldest entry. [`unwind`](Self::unwind)
/// takes the lock for the whole copy, so a snapshot never reflects a
/// half-finished insert.
#[derive(Debug)]
pub struct ConcurrentCache<T> {
    capacity: usize,
    entries: Mutex<VecDeque<T>>,
}

impl<T: Clone> ConcurrentCache<T> {
    /// Create a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> LogResult<Self> {
        if capacity == 0 {
            return Err(LogError::InvalidCapacity(capacity));
        }
        Ok(Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        })
    }

    /// Insert an entry, dropping the oldest one if the cache is full.
    pub fn insert(&self, entry: T) {
        let mut entries = self.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Copy the cached entries out, newest first.
    pub fn unwind(&self) -> Vec<T> {
        self.lock().iter().rev().cloned().collect()
    }

    /// Maximum number of entries retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Return `true` if nothing has been inserted since creation or the last clear.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    // A writer that panicked mid-insert cannot leave the deque half-updated,
    // so a poisoned lock is still safe to read and write.
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> Default for ConcurrentCache<T> {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            entries: Mutex::new(VecDeque::with_capacity(DEFAULT_CAPACITY)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn zero_capacity_is_rejected() {
        let err = ConcurrentCache::<String>::new(0).unwrap_err();
        assert!(matches!(err, LogError::InvalidCapacity(0)));
    }

    #[test]
    fn default_capacity() {
        let cache = ConcurrentCache::<u32>::default();
        assert_eq!(cache.capacity(), DEFAULT_CAPACITY);
        assert!(cache.is_empty());
    }

    #[test]
    fn overflow_keeps_newest_first() {
        let cache = ConcurrentCache::new(10).unwrap();
        for i in 0..15 {
            cache.insert(i);
        }
        // [14, 13, ..., 5]
        let expected: Vec<i32> = (5..15).rev().collect();
        assert_eq!(cache.unwind(), expected);
        assert_eq!(cache.len(), 10);
    }

    #[test]
    fn partial_fill_unwinds_only_written_entries() {
        let cache = ConcurrentCache::new(10).unwrap();
        cache.insert("a");
        cache.insert("b");
        cache.insert("c");
        assert_eq!(cache.unwind(), vec!["c", "b", "a"]);
    }

    #[test]
    fn unwind_is_a_copy() {
        let cache = ConcurrentCache::new(3).unwrap();
        cache.insert(1);
        let snapshot = cache.unwind();
        cache.insert(2);
        assert_eq!(snapshot, vec![1]);
        assert_eq!(cache.unwind(), vec![2, 1]);
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = ConcurrentCache::new(3).unwrap();
        cache.insert(1);
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.unwind().is_empty());
    }

    #[test]
    fn concurrent_inserts_are_all_counted() {
        let cache = Arc::new(ConcurrentCache::new(1000).unwrap());
        thread::scope(|scope| {
            for t in 0..8 {
                let cache = Arc::clone(&cache);
                scope.spawn(move || {
                    for i in 0..100 {
                        cache.insert(t * 100 + i);
                    }
                });
            }
        });
        let mut all = cache.unwind();
        assert_eq!(all.len(), 800);
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 800);
    }

    #[test]
    fn concurrent_overflow_stays_bounded() {
        let cache = Arc::new(ConcurrentCache::new(16).unwrap());
        thread::scope(|scope| {
            for _ in 0..4 {
                let cache = Arc::clone(&cache);
                scope.spawn(move || {
                    for i in 0..500 {
                        cache.insert(i);
                        assert!(cache.unwind().len() <= 16);
                    }
                });
            }
        });
        assert_eq!(cache.len(), 16);
    }

    proptest! {
        #[test]
        fn unwind_matches_most_recent_inserts(
            capacity in 1usize..32,
            items in proptest::collection::vec(any::<u16>(), 0..100),
        ) {
            let cache = ConcurrentCache::new(capacity).unwrap();
            for item in &items {
                cache.insert(*item);
            }
            let expected: Vec<u16> = items.iter().rev().take(capacity).copied().collect();
            prop_assert_eq!(cache.unwind(), expected);
        }
    }
}
