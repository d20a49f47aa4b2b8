//! Cache Store Module
//!
//! The in-memory entry store: HashMap storage with FIFO eviction, TTL expiry,
//! deferred activation, counters, alerts and the structured event log.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::cache::log::*;
use crate::cache::{
    ActivationHeuristic, AlertBuffer, CacheAlert, CacheEntry, CacheKey, CacheLog, CacheLogger,
    CacheMetrics, CacheParams, CacheStats, FifoTracker, InvalidationWindow, SharedClock,
    SystemClock, Trigger,
};
use crate::config::CacheConfig;
use crate::error::Result;

// == Cache Store ==
/// In-memory response cache keyed by encoded request parameters.
#[derive(Debug)]
pub struct CacheStore<T> {
    name: String,
    config: CacheConfig,
    /// Key-value storage
    entries: HashMap<CacheKey, CacheEntry<T>>,
    /// Insertion order for eviction
    order: FifoTracker,
    stats: CacheStats,
    invalidations: InvalidationWindow,
    activation: ActivationHeuristic,
    logger: CacheLogger,
    alerts: AlertBuffer,
    clock: SharedClock,
}

impl<T: Clone> CacheStore<T> {
    // == Constructor ==
    /// Creates a new CacheStore on the system clock.
    pub fn new(name: impl Into<String>, config: CacheConfig) -> Self {
        Self::with_clock(name, config, Arc::new(SystemClock))
    }

    /// Creates a new CacheStore reading time from `clock`.
    pub fn with_clock(name: impl Into<String>, config: CacheConfig, clock: SharedClock) -> Self {
        let name = name.into();
        Self {
            entries: HashMap::new(),
            order: FifoTracker::new(),
            stats: CacheStats::new(),
            invalidations: InvalidationWindow::new(),
            activation: ActivationHeuristic::new(&config),
            logger: CacheLogger::new(name.clone()),
            alerts: AlertBuffer::new(),
            clock,
            config,
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn is_active(&self) -> bool {
        self.activation.is_active()
    }

    // == Get ==
    /// Looks up the value stored for `params`.
    pub fn get(&mut self, params: &CacheParams) -> Result<Option<T>> {
        self.get_observed(params, None)
    }

    /// Looks up the value for `params`, reporting the caller's last observed
    /// round-trip latency for it to the activation heuristic.
    ///
    /// While the cache is inert every lookup misses.
    pub fn get_observed(&mut self, params: &CacheParams, latency_ms: Option<u64>) -> Result<Option<T>> {
        let key = params.encode()?;

        if let Some(trigger) = self.activation.record_request(&key) {
            self.log_activation(&key, trigger);
        }
        if let Some(ms) = latency_ms {
            self.observe_key(&key, ms);
        }

        let now = self.now();
        if !self.activation.is_active() {
            self.stats.record_miss();
            self.logger.debug(
                now,
                EVENT_MISS,
                Some(json!({ "key": key.as_str(), "reason": "inactive" })),
            );
            return Ok(None);
        }

        Ok(self.lookup(&key, now))
    }

    /// Reports a round-trip latency for `params` without performing a lookup.
    pub fn observe_latency(&mut self, params: &CacheParams, latency_ms: u64) -> Result<()> {
        let key = params.encode()?;
        self.observe_key(&key, latency_ms);
        Ok(())
    }

    fn observe_key(&mut self, key: &CacheKey, latency_ms: u64) {
        if let Some(trigger) = self.activation.record_latency(key, latency_ms) {
            self.log_activation(key, trigger);
        }
    }

    fn lookup(&mut self, key: &CacheKey, now: u64) -> Option<T> {
        let expired = match self.entries.get(key) {
            None => {
                self.stats.record_miss();
                self.logger
                    .debug(now, EVENT_MISS, Some(json!({ "key": key.as_str() })));
                return None;
            }
            Some(entry) => entry.is_expired(now),
        };

        if expired {
            self.remove_expired(key, now, "access");
            self.stats.record_miss();
            return None;
        }

        let value = self.entries.get(key).map(|entry| entry.value.clone());
        self.stats.record_hit();
        self.logger
            .debug(now, EVENT_HIT, Some(json!({ "key": key.as_str() })));
        value
    }

    // == Set ==
    /// Stores `value` for `params`.
    ///
    /// Returns `Ok(false)` when the value was dropped because the cache is
    /// inert. Overwriting an existing key keeps its insertion position; a new
    /// key at capacity first evicts the oldest-inserted entry.
    pub fn set(&mut self, params: &CacheParams, value: T) -> Result<bool> {
        let key = params.encode()?;
        Ok(self.insert(key, value))
    }

    fn insert(&mut self, key: CacheKey, value: T) -> bool {
        let now = self.now();
        if !self.activation.is_active() {
            self.logger.debug(
                now,
                EVENT_SET_SKIPPED,
                Some(json!({ "key": key.as_str(), "reason": "inactive" })),
            );
            return false;
        }

        let entry = CacheEntry::new(value, now, self.config.ttl_ms);
        if !self.make_room(&key, now) {
            return false;
        }

        self.logger.debug(
            now,
            EVENT_SET,
            Some(json!({ "key": key.as_str(), "ttl": self.config.ttl_ms })),
        );
        self.order.push(&key);
        self.entries.insert(key, entry);
        self.stats.record_set();
        self.stats.set_total_entries(self.entries.len());
        true
    }

    /// Evicts until `key` fits. Returns false if nothing can be stored.
    fn make_room(&mut self, key: &CacheKey, now: u64) -> bool {
        if self.entries.contains_key(key) {
            return true;
        }
        if self.config.max_size == 0 {
            self.logger.debug(
                now,
                EVENT_SET_SKIPPED,
                Some(json!({ "key": key.as_str(), "reason": "zero_capacity" })),
            );
            return false;
        }
        while self.entries.len() >= self.config.max_size {
            match self.order.evict_oldest() {
                Some(victim) => {
                    if self.entries.remove(&victim).is_some() {
                        self.stats.record_eviction();
                        self.logger.debug(
                            now,
                            EVENT_EVICTED,
                            Some(json!({ "key": victim.as_str() })),
                        );
                    }
                }
                None => break,
            }
        }
        true
    }

    // == Delete ==
    /// Removes the entry for `params`. Returns whether one existed.
    pub fn delete(&mut self, params: &CacheParams) -> Result<bool> {
        let key = params.encode()?;
        let now = self.now();
        if self.entries.remove(&key).is_none() {
            return Ok(false);
        }

        self.order.remove(&key);
        self.stats.record_delete();
        self.stats.set_total_entries(self.entries.len());
        self.invalidations.record(now);
        self.logger
            .info(now, EVENT_DELETE, Some(json!({ "key": key.as_str() })));
        Ok(true)
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&mut self) {
        let now = self.now();
        let removed = self.entries.len();
        self.discard_all();
        self.invalidations.record(now);
        self.logger
            .info(now, EVENT_CLEARED, Some(json!({ "entries": removed })));
    }

    /// Drops all entries without recording an invalidation.
    pub(crate) fn discard_all(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.stats.set_total_entries(0);
    }

    // == Refresh ==
    /// Extends the lifetime of a live entry to `now + ttl`. Returns false if
    /// there is no live entry for `params`.
    pub fn refresh(&mut self, params: &CacheParams) -> Result<bool> {
        let key = params.encode()?;
        let now = self.now();
        let ttl_ms = self.config.ttl_ms;

        let expired = match self.entries.get_mut(&key) {
            None => return Ok(false),
            Some(entry) if entry.is_expired(now) => true,
            Some(entry) => {
                entry.extend(now, ttl_ms);
                false
            }
        };

        if expired {
            self.remove_expired(&key, now, "refresh");
            return Ok(false);
        }

        self.logger
            .debug(now, EVENT_REFRESH, Some(json!({ "key": key.as_str() })));
        Ok(true)
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Uses the same boundary as `get`: an entry is expired once
    /// `now >= expires_at`. Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.now();
        let expired_keys: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_expired(key, now, "sweep");
            self.stats.record_delete();
        }

        let count = expired_keys.len();
        if count > 0 {
            self.logger
                .info(now, EVENT_CLEANUP, Some(json!({ "removed": count })));
        }
        count
    }

    fn remove_expired(&mut self, key: &CacheKey, now: u64, source: &str) {
        self.entries.remove(key);
        self.order.remove(key);
        self.stats.record_expiration();
        self.stats.set_total_entries(self.entries.len());
        self.invalidations.record(now);
        self.logger.info(
            now,
            EVENT_EXPIRED,
            Some(json!({ "key": key.as_str(), "source": source })),
        );
    }

    // == Decay ==
    /// Purges log records older than an hour and alerts past their retention.
    ///
    /// Returns the number of records and alerts removed.
    pub fn decay(&mut self) -> usize {
        let now = self.now();
        self.logger.decay(now) + self.alerts.decay(now, self.config.alert_retention_ms)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats.max_size = self.config.max_size;
        stats.ttl_ms = self.config.ttl_ms;
        stats.is_active = self.activation.is_active();
        stats.auto_activate = self.activation.auto_activate();
        stats
    }

    // == Metrics ==
    /// Computes current metrics, raising and recording any alerts they trip.
    pub fn metrics(&mut self) -> CacheMetrics {
        let now = self.now();
        let live: Vec<u64> = self
            .entries
            .values()
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.age_ms(now))
            .collect();
        let avg_data_age = if live.is_empty() {
            0.0
        } else {
            live.iter().sum::<u64>() as f64 / live.len() as f64
        };

        let mut metrics = CacheMetrics::compute(
            &self.stats(),
            self.activation.avg_response_time_ms(),
            avg_data_age,
            self.invalidations.per_minute(now),
        );

        for alert in metrics.evaluate_alerts(now) {
            self.logger.warn(
                now,
                EVENT_ALERT,
                Some(json!({
                    "type": alert.kind,
                    "severity": alert.severity,
                    "message": alert.message,
                })),
            );
            self.alerts.push(alert);
        }
        metrics.alerts = self.alerts.snapshot();
        metrics
    }

    /// The most recent `limit` log records, oldest first.
    pub fn logs(&self, limit: usize) -> Vec<CacheLog> {
        self.logger.recent(limit)
    }

    pub fn alerts(&self) -> Vec<CacheAlert> {
        self.alerts.snapshot()
    }

    // == Activation Overrides ==
    pub fn force_activate(&mut self) -> bool {
        let changed = self.activation.force_activate();
        if changed {
            let now = self.now();
            self.logger
                .info(now, EVENT_ACTIVATED, Some(json!({ "reason": "forced" })));
        }
        changed
    }

    /// Returns the cache to inert. Stored entries stay but are not served.
    pub fn force_deactivate(&mut self) -> bool {
        let changed = self.activation.force_deactivate();
        if changed {
            let now = self.now();
            self.logger
                .info(now, EVENT_DEACTIVATED, Some(json!({ "reason": "forced" })));
        }
        changed
    }

    fn log_activation(&mut self, key: &CacheKey, trigger: Trigger) {
        let now = self.now();
        let mut data = serde_json::to_value(trigger).unwrap_or(Value::Null);
        if let Value::Object(map) = &mut data {
            map.insert("key".to_string(), Value::String(key.as_str().to_string()));
        }
        self.logger.info(now, EVENT_ACTIVATED, Some(data));
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Persistence Hooks ==
    /// Entries in insertion order, oldest first.
    pub(crate) fn iter_entries(&self) -> impl Iterator<Item = (&CacheKey, &CacheEntry<T>)> {
        self.order
            .iter()
            .filter_map(move |key| self.entries.get(key).map(|entry| (key, entry)))
    }

    /// Re-inserts a persisted entry with its original timestamps.
    ///
    /// Honors capacity but not the activation gate. Returns false for entries
    /// already expired at `now`.
    pub(crate) fn restore(&mut self, key: CacheKey, entry: CacheEntry<T>) -> bool {
        let now = self.now();
        if entry.is_expired(now) || !self.make_room(&key, now) {
            return false;
        }
        self.order.push(&key);
        self.entries.insert(key, entry);
        self.stats.set_total_entries(self.entries.len());
        true
    }

    pub(crate) fn log(&mut self, level: LogLevel, event: &str, data: Option<Value>) {
        let now = self.now();
        self.logger.log(now, level, event, data);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{AlertKind, ManualClock};
    use crate::error::CacheError;
    use crate::cache::ParamValue;

    fn params(name: &str) -> CacheParams {
        CacheParams::new().text("key", name)
    }

    fn store_at(clock: &ManualClock, config: CacheConfig) -> CacheStore<i32> {
        CacheStore::with_clock("test", config, Arc::new(clock.clone()))
    }

    #[test]
    fn test_store_new() {
        let store: CacheStore<i32> = CacheStore::new("test", CacheConfig::default());
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert!(store.is_active());
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store: CacheStore<String> = CacheStore::new("test", CacheConfig::default());

        assert!(store.set(&params("a"), "value1".to_string()).unwrap());
        let value = store.get(&params("a")).unwrap();

        assert_eq!(value.as_deref(), Some("value1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store: CacheStore<i32> = CacheStore::new("test", CacheConfig::default());

        assert_eq!(store.get(&params("missing")).unwrap(), None);
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_delete() {
        let mut store: CacheStore<i32> = CacheStore::new("test", CacheConfig::default());

        store.set(&params("a"), 1).unwrap();
        assert!(store.delete(&params("a")).unwrap());
        assert!(!store.delete(&params("a")).unwrap());

        assert!(store.is_empty());
        assert_eq!(store.get(&params("a")).unwrap(), None);
        assert_eq!(store.stats().deletes, 1);
    }

    #[test]
    fn test_store_overwrite() {
        let mut store: CacheStore<i32> = CacheStore::new("test", CacheConfig::default());

        store.set(&params("a"), 1).unwrap();
        store.set(&params("a"), 2).unwrap();

        assert_eq!(store.get(&params("a")).unwrap(), Some(2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let clock = ManualClock::new(0);
        let mut store = store_at(&clock, CacheConfig::new(1_000, 10));

        store.set(&params("a"), 1).unwrap();

        clock.set(999);
        assert_eq!(store.get(&params("a")).unwrap(), Some(1));

        clock.set(1_000);
        assert_eq!(store.get(&params("a")).unwrap(), None);
        assert!(store.is_empty(), "expired entry is deleted on access");

        let stats = store.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.misses, 1);
        assert!(store.logs(10).iter().any(|l| l.event == EVENT_EXPIRED));
    }

    #[test]
    fn test_store_fifo_eviction_ignores_reads() {
        let clock = ManualClock::new(0);
        let mut store = store_at(&clock, CacheConfig::new(60_000, 3));

        store.set(&params("a"), 1).unwrap();
        store.set(&params("b"), 2).unwrap();
        store.set(&params("c"), 3).unwrap();

        // Reading "a" does not protect it.
        store.get(&params("a")).unwrap();
        store.set(&params("d"), 4).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.get(&params("a")).unwrap(), None);
        assert_eq!(store.get(&params("b")).unwrap(), Some(2));
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_overwrite_at_capacity_does_not_evict() {
        let mut store: CacheStore<i32> = CacheStore::new("test", CacheConfig::new(60_000, 2));

        store.set(&params("a"), 1).unwrap();
        store.set(&params("b"), 2).unwrap();
        store.set(&params("a"), 10).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().evictions, 0);
        assert_eq!(store.get(&params("b")).unwrap(), Some(2));
    }

    #[test]
    fn test_end_to_end_scenario() {
        let clock = ManualClock::new(0);
        let mut store = store_at(&clock, CacheConfig::new(1_000, 2));

        store.set(&params("A"), 1).unwrap();
        clock.set(100);
        store.set(&params("B"), 2).unwrap();
        clock.set(200);
        store.set(&params("C"), 3).unwrap();

        assert_eq!(store.get(&params("A")).unwrap(), None);
        assert_eq!(store.get(&params("B")).unwrap(), Some(2));
        assert_eq!(store.get(&params("C")).unwrap(), Some(3));

        clock.set(1_150);
        assert_eq!(store.get(&params("B")).unwrap(), None);
        assert_eq!(store.get(&params("C")).unwrap(), Some(3));

        clock.set(1_200);
        assert_eq!(store.get(&params("C")).unwrap(), None);
    }

    #[test]
    fn test_store_refresh() {
        let clock = ManualClock::new(0);
        let mut store = store_at(&clock, CacheConfig::new(1_000, 10));

        store.set(&params("a"), 1).unwrap();
        clock.set(900);
        assert!(store.refresh(&params("a")).unwrap());

        clock.set(1_500);
        assert_eq!(store.get(&params("a")).unwrap(), Some(1));

        clock.set(1_900);
        assert!(!store.refresh(&params("a")).unwrap());
        assert!(!store.refresh(&params("missing")).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_cleanup_expired() {
        let clock = ManualClock::new(0);
        let mut store = store_at(&clock, CacheConfig::new(1_000, 10));

        store.set(&params("a"), 1).unwrap();
        clock.set(500);
        store.set(&params("b"), 2).unwrap();

        clock.set(1_200);
        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().deletes, 1);
        assert_eq!(store.get(&params("b")).unwrap(), Some(2));
    }

    #[test]
    fn test_cleanup_uses_get_expiry_boundary() {
        let clock = ManualClock::new(0);
        let mut store = store_at(&clock, CacheConfig::new(1_000, 10));
        store.set(&params("a"), 1).unwrap();

        clock.set(999);
        assert_eq!(store.cleanup_expired(), 0, "still valid one tick before expiry");
        assert_eq!(store.len(), 1);

        clock.set(1_000);
        assert_eq!(store.cleanup_expired(), 1, "expired exactly at expires_at");
        assert!(store.is_empty());
        let stats = store.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.deletes, 1);
    }

    #[test]
    fn test_store_clear() {
        let mut store: CacheStore<i32> = CacheStore::new("test", CacheConfig::default());
        store.set(&params("a"), 1).unwrap();
        store.set(&params("b"), 2).unwrap();

        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.logs(1)[0].event, EVENT_CLEARED);
    }

    #[test]
    fn test_hit_miss_accounting() {
        let mut store: CacheStore<usize> = CacheStore::new("test", CacheConfig::default());
        for i in 0..20 {
            let p = params(&format!("k{}", i));
            store.set(&p, i).unwrap();
            assert_eq!(store.get(&p).unwrap(), Some(i));
        }
        let stats = store.stats();
        assert_eq!(stats.hits, 20);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_serialization_error_propagates() {
        let mut store: CacheStore<i32> = CacheStore::new("test", CacheConfig::default());
        let bad = CacheParams::new().with("ratio", ParamValue::Number(f64::NAN));

        assert!(matches!(store.set(&bad, 1), Err(CacheError::Serialization(_))));
        assert!(matches!(store.get(&bad), Err(CacheError::Serialization(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_inert_cache_never_hits() {
        let config = CacheConfig::default().with_auto_activate(10_000, 100);
        let mut store: CacheStore<i32> = CacheStore::new("test", config);

        for _ in 0..5 {
            assert!(!store.set(&params("a"), 1).unwrap());
            assert_eq!(store.get(&params("a")).unwrap(), None);
        }
        assert!(store.is_empty());
        assert!(!store.stats().is_active);
    }

    #[test]
    fn test_usage_threshold_activates_caching() {
        let config = CacheConfig::default().with_auto_activate(10_000, 3);
        let mut store: CacheStore<i32> = CacheStore::new("test", config);

        for _ in 0..2 {
            store.get(&params("a")).unwrap();
            assert!(!store.set(&params("a"), 1).unwrap());
        }
        // Third lookup crosses the threshold.
        assert_eq!(store.get(&params("a")).unwrap(), None);
        assert!(store.is_active());

        assert!(store.set(&params("a"), 1).unwrap());
        assert_eq!(store.get(&params("a")).unwrap(), Some(1));
    }

    #[test]
    fn test_slow_latency_activates_caching() {
        let config = CacheConfig::default().with_auto_activate(500, 100);
        let mut store: CacheStore<i32> = CacheStore::new("test", config);

        store.get_observed(&params("a"), Some(200)).unwrap();
        assert!(!store.is_active());

        store.observe_latency(&params("a"), 750).unwrap();
        assert!(store.is_active());
        assert!(store.logs(10).iter().any(|l| l.event == EVENT_ACTIVATED));
    }

    #[test]
    fn test_force_activation_overrides() {
        let config = CacheConfig::default().with_auto_activate(10_000, 100);
        let mut store: CacheStore<i32> = CacheStore::new("test", config);

        assert!(store.force_activate());
        store.set(&params("a"), 1).unwrap();
        assert_eq!(store.get(&params("a")).unwrap(), Some(1));

        assert!(store.force_deactivate());
        assert_eq!(store.get(&params("a")).unwrap(), None);
    }

    #[test]
    fn test_metrics_and_alerts() {
        let clock = ManualClock::new(0);
        let mut store = store_at(&clock, CacheConfig::new(60_000, 10));

        store.set(&params("a"), 1).unwrap();
        clock.set(10_000);
        for i in 0..11 {
            store.get(&params(&format!("miss{}", i))).unwrap();
        }
        store.get(&params("a")).unwrap();

        let metrics = store.metrics();
        assert_eq!(metrics.total_requests, 12);
        assert_eq!(metrics.cache_size, 1);
        assert_eq!(metrics.avg_data_age, 10_000.0);
        assert!(metrics.performance_score < 100.0);
        assert_eq!(metrics.alerts.len(), 1);
        assert_eq!(metrics.alerts[0].kind, AlertKind::LowHitRate);
        assert_eq!(store.alerts().len(), 1);
        assert!(store.logs(5).iter().any(|l| l.event == EVENT_ALERT));
    }

    #[test]
    fn test_invalidation_frequency_counts_last_minute() {
        let clock = ManualClock::new(0);
        let mut store = store_at(&clock, CacheConfig::new(60_000, 10));

        store.set(&params("a"), 1).unwrap();
        store.delete(&params("a")).unwrap();
        store.clear();
        assert_eq!(store.metrics().invalidation_frequency, 2);

        clock.set(61_000);
        assert_eq!(store.metrics().invalidation_frequency, 0);
    }

    #[test]
    fn test_decay_purges_logs_and_alerts() {
        let clock = ManualClock::new(0);
        let config = CacheConfig::new(60_000, 1).with_alert_retention_ms(1_000);
        let mut store = store_at(&clock, config);

        store.set(&params("a"), 1).unwrap();
        store.metrics(); // full cache raises an alert
        assert_eq!(store.alerts().len(), 1);

        clock.set(2 * LOG_RETENTION_MS);
        assert!(store.decay() >= 2);
        assert!(store.alerts().is_empty());
        assert!(store.logs(100).is_empty());
    }
}
