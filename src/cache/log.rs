//! Structured Logger Module
//!
//! Bounded in-memory record of cache events for diagnostic panels. Every
//! record is also emitted through `tracing` with the cache name attached.

use std::collections::VecDeque;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

/// Maximum number of log records retained.
pub const MAX_LOGS: usize = 1000;

/// Records older than this are purged on decay.
pub const LOG_RETENTION_MS: u64 = 60 * 60 * 1000;

// == Event Names ==
pub const EVENT_SET: &str = "cache_set";
pub const EVENT_HIT: &str = "cache_hit";
pub const EVENT_MISS: &str = "cache_miss";
pub const EVENT_EXPIRED: &str = "cache_expired";
pub const EVENT_DELETE: &str = "cache_delete";
pub const EVENT_CLEARED: &str = "cache_cleared";
pub const EVENT_REFRESH: &str = "cache_refresh";
pub const EVENT_EVICTED: &str = "cache_evicted";
pub const EVENT_CLEANUP: &str = "cache_cleanup";
pub const EVENT_ACTIVATED: &str = "cache_activated";
pub const EVENT_DEACTIVATED: &str = "cache_deactivated";
pub const EVENT_SET_SKIPPED: &str = "cache_set_skipped";
pub const EVENT_ALERT: &str = "cache_alert_generated";
pub const EVENT_PERSISTED: &str = "cache_persisted";
pub const EVENT_PERSIST_SKIPPED: &str = "cache_persist_skipped";
pub const EVENT_PERSIST_FAILED: &str = "cache_persist_failed";
pub const EVENT_QUOTA_RECOVERY: &str = "cache_quota_recovery";
pub const EVENT_RESTORED: &str = "cache_restored";
pub const EVENT_CORRUPTED: &str = "cache_storage_corrupted";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

// == Cache Log ==
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheLog {
    /// Unix milliseconds
    pub timestamp: u64,
    pub level: LogLevel,
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// == Cache Logger ==
#[derive(Debug)]
pub struct CacheLogger {
    cache_name: String,
    records: VecDeque<CacheLog>,
    capacity: usize,
}

impl CacheLogger {
    pub fn new(cache_name: impl Into<String>) -> Self {
        Self::with_capacity(cache_name, MAX_LOGS)
    }

    pub fn with_capacity(cache_name: impl Into<String>, capacity: usize) -> Self {
        Self {
            cache_name: cache_name.into(),
            records: VecDeque::with_capacity(capacity.min(MAX_LOGS)),
            capacity,
        }
    }

    /// Appends a record, dropping the oldest when full.
    pub fn log(&mut self, now: u64, level: LogLevel, event: &str, data: Option<Value>) {
        let cache = self.cache_name.as_str();
        match (level, &data) {
            (LogLevel::Debug, Some(d)) => debug!(cache = %cache, data = %d, "{}", event),
            (LogLevel::Debug, None) => debug!(cache = %cache, "{}", event),
            (LogLevel::Info, Some(d)) => info!(cache = %cache, data = %d, "{}", event),
            (LogLevel::Info, None) => info!(cache = %cache, "{}", event),
            (LogLevel::Warn, Some(d)) => warn!(cache = %cache, data = %d, "{}", event),
            (LogLevel::Warn, None) => warn!(cache = %cache, "{}", event),
            (LogLevel::Error, Some(d)) => error!(cache = %cache, data = %d, "{}", event),
            (LogLevel::Error, None) => error!(cache = %cache, "{}", event),
        }

        if self.capacity == 0 {
            return;
        }
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(CacheLog {
            timestamp: now,
            level,
            event: event.to_string(),
            data,
        });
    }

    pub fn debug(&mut self, now: u64, event: &str, data: Option<Value>) {
        self.log(now, LogLevel::Debug, event, data);
    }

    pub fn info(&mut self, now: u64, event: &str, data: Option<Value>) {
        self.log(now, LogLevel::Info, event, data);
    }

    pub fn warn(&mut self, now: u64, event: &str, data: Option<Value>) {
        self.log(now, LogLevel::Warn, event, data);
    }

    /// Purges records older than one hour. Returns how many went.
    pub fn decay(&mut self, now: u64) -> usize {
        let cutoff = now.saturating_sub(LOG_RETENTION_MS);
        let before = self.records.len();
        self.records.retain(|r| r.timestamp >= cutoff);
        before - self.records.len()
    }

    /// The most recent `limit` records, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<CacheLog> {
        let skip = self.records.len().saturating_sub(limit);
        self.records.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
