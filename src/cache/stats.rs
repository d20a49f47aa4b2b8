//! Cache Statistics Module
//!
//! Tracks cache counters and the rolling window of invalidation events.

use std::collections::VecDeque;

use serde::Serialize;

/// Window over which invalidation frequency is measured.
pub const INVALIDATION_WINDOW_MS: u64 = 60_000;

/// Upper bound on remembered invalidation timestamps.
const MAX_INVALIDATION_EVENTS: usize = 1000;

// == Cache Stats ==
/// Snapshot of cache counters, as served by `get_stats`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CacheStats {
    /// Lookups that returned a live value
    pub hits: u64,
    /// Lookups that found nothing, an expired entry, or an inert cache
    pub misses: u64,
    /// Values actually stored
    pub sets: u64,
    /// Explicit deletions plus entries removed by the sweep
    pub deletes: u64,
    /// Entries dropped to make room
    pub evictions: u64,
    /// Entries found expired on access or by the sweep
    pub expirations: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    pub max_size: usize,
    pub ttl_ms: u64,
    /// Whether the cache is storing and serving entries
    pub is_active: bool,
    pub auto_activate: bool,
}

impl CacheStats {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn miss_rate(&self) -> f64 {
        if self.total_requests() == 0 {
            0.0
        } else {
            1.0 - self.hit_rate()
        }
    }

    pub fn total_requests(&self) -> u64 {
        self.hits + self.misses
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_set(&mut self) {
        self.sets += 1;
    }

    pub fn record_delete(&mut self) {
        self.deletes += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Invalidation Window ==
/// Timestamps of delete, expire and clear events.
#[derive(Debug, Default)]
pub struct InvalidationWindow {
    events: VecDeque<u64>,
}

impl InvalidationWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, now: u64) {
        if self.events.len() == MAX_INVALIDATION_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(now);
    }

    /// Events within the last minute before `now`.
    pub fn per_minute(&mut self, now: u64) -> u64 {
        let cutoff = now.saturating_sub(INVALIDATION_WINDOW_MS);
        while self.events.front().is_some_and(|&t| t < cutoff) {
            self.events.pop_front();
        }
        self.events.len() as u64
    }
}
