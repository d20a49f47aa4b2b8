//! FIFO Tracker Module
//!
//! Tracks insertion order for capacity eviction. Reads and overwrites never
//! reorder keys, so the next victim is always the oldest-inserted live key.

use std::collections::VecDeque;

use crate::cache::CacheKey;

// == FIFO Tracker ==
/// Insertion-order tracker.
///
/// Keys are stored in a VecDeque where:
/// - Front = Oldest inserted
/// - Back = Newest inserted
#[derive(Debug, Default)]
pub struct FifoTracker {
    order: VecDeque<CacheKey>,
}

impl FifoTracker {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Push ==
    /// Records a newly inserted key. Keys already tracked keep their position.
    pub fn push(&mut self, key: &CacheKey) {
        if !self.contains(key) {
            self.order.push_back(key.clone());
        }
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &CacheKey) {
        self.order.retain(|k| k != key);
    }

    // == Evict Oldest ==
    /// Returns and removes the oldest-inserted key.
    ///
    /// Returns None if tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<CacheKey> {
        self.order.pop_front()
    }

    /// Returns the oldest-inserted key without removing it.
    pub fn peek_oldest(&self) -> Option<&CacheKey> {
        self.order.front()
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.order.iter().any(|k| k == key)
    }

    /// Keys from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &CacheKey> {
        self.order.iter()
    }
}
