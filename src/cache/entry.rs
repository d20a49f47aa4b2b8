//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    /// The stored value, never inspected by the cache
    pub value: T,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), always >= `created_at`
    pub expires_at: u64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new cache entry created at `now` that lives for `ttl_ms`.
    pub fn new(value: T, now: u64, ttl_ms: u64) -> Self {
        Self {
            value,
            created_at: now,
            expires_at: now.saturating_add(ttl_ms),
        }
    }

    /// Rebuilds an entry from stored timestamps.
    ///
    /// Returns `None` when `expires_at` precedes `created_at`.
    pub fn from_parts(value: T, created_at: u64, expires_at: u64) -> Option<Self> {
        (expires_at >= created_at).then_some(Self {
            value,
            created_at,
            expires_at,
        })
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is dead once `now >= expires_at`, so a value set at `t` with a
    /// TTL of `d` is readable strictly before `t + d`.
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at
    }

    /// Age of the entry at `now`, in milliseconds.
    pub fn age_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.created_at)
    }

    /// Remaining lifetime in milliseconds; zero once expired.
    pub fn ttl_remaining_ms(&self, now: u64) -> u64 {
        self.expires_at.saturating_sub(now)
    }

    /// Pushes the expiry out to `now + ttl_ms` without touching the value.
    pub fn extend(&mut self, now: u64, ttl_ms: u64) {
        self.expires_at = now.saturating_add(ttl_ms).max(self.created_at);
    }
}
