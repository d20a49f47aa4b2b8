//! Persistent Cache Module
//!
//! Wraps an in-memory [`CacheStore`] and mirrors it to durable storage under
//! a versioned JSON envelope. The in-memory store stays authoritative; the
//! envelope is rewritten after each mutation and only read back at
//! construction or on an explicit reload.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::cache::log::*;
use crate::cache::{
    CacheAlert, CacheEntry, CacheKey, CacheLog, CacheMetrics, CacheParams, CacheStats, CacheStore,
    ResponseCache, SharedClock, SystemClock,
};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::storage::{DurableStorage, StorageError};

/// Envelope version written by this build. Any other version is discarded.
pub const STORAGE_VERSION: &str = "1.0.0";

/// Serialized envelopes larger than this are not written.
pub const MAX_PERSISTED_BYTES: usize = 5 * 1024 * 1024;

/// Sibling keys removed at most when storage runs out of quota.
const MAX_SIBLING_EVICTIONS: usize = 3;

/// Substring identifying other caches' durable keys.
const SIBLING_MARKER: &str = "cache";

// == Envelope ==
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedEntry<V> {
    pub data: V,
    /// Creation time, Unix milliseconds
    pub timestamp: u64,
    pub expires_at: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeMetadata {
    pub entries: usize,
    pub ttl: u64,
    pub max_size: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedEnvelope<V> {
    pub version: String,
    pub timestamp: u64,
    pub cache: BTreeMap<String, PersistedEntry<V>>,
    pub metadata: EnvelopeMetadata,
}

/// Why a stored envelope was thrown away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Corruption {
    Parse,
    Shape,
    Version,
    Entries,
}

impl Corruption {
    fn as_str(self) -> &'static str {
        match self {
            Corruption::Parse => "parse_error",
            Corruption::Shape => "shape_mismatch",
            Corruption::Version => "version_mismatch",
            Corruption::Entries => "invalid_entries",
        }
    }
}

// == Persistent Cache ==
/// A [`CacheStore`] backed by durable storage.
#[derive(Debug)]
pub struct PersistentCache<T, S> {
    inner: CacheStore<T>,
    storage: S,
    storage_key: String,
    max_persisted_bytes: usize,
}

impl<T, S> PersistentCache<T, S>
where
    T: Clone + Serialize + DeserializeOwned,
    S: DurableStorage,
{
    // == Constructor ==
    /// Creates the cache and restores whatever valid, unexpired entries
    /// `storage` holds under `storage_key`.
    pub fn new(
        name: impl Into<String>,
        config: CacheConfig,
        storage: S,
        storage_key: impl Into<String>,
    ) -> Self {
        Self::with_clock(name, config, storage, storage_key, Arc::new(SystemClock))
    }

    pub fn with_clock(
        name: impl Into<String>,
        config: CacheConfig,
        storage: S,
        storage_key: impl Into<String>,
        clock: SharedClock,
    ) -> Self {
        let mut cache = Self {
            inner: CacheStore::with_clock(name, config, clock),
            storage,
            storage_key: storage_key.into(),
            max_persisted_bytes: MAX_PERSISTED_BYTES,
        };
        cache.load();
        cache
    }

    /// Overrides the size cap on serialized envelopes.
    pub fn with_max_persisted_bytes(mut self, bytes: usize) -> Self {
        self.max_persisted_bytes = bytes;
        self
    }

    pub fn inner(&self) -> &CacheStore<T> {
        &self.inner
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    // == Operations ==
    pub fn get(&mut self, params: &CacheParams) -> Result<Option<T>> {
        self.get_observed(params, None)
    }

    pub fn get_observed(&mut self, params: &CacheParams, latency_ms: Option<u64>) -> Result<Option<T>> {
        let before = self.inner.len();
        let value = self.inner.get_observed(params, latency_ms)?;
        if self.inner.len() < before {
            self.persist();
        }
        Ok(value)
    }

    pub fn set(&mut self, params: &CacheParams, value: T) -> Result<bool> {
        let stored = self.inner.set(params, value)?;
        if stored {
            self.persist();
        }
        Ok(stored)
    }

    pub fn delete(&mut self, params: &CacheParams) -> Result<bool> {
        let removed = self.inner.delete(params)?;
        if removed {
            self.persist();
        }
        Ok(removed)
    }

    pub fn refresh(&mut self, params: &CacheParams) -> Result<bool> {
        let before = self.inner.len();
        let refreshed = self.inner.refresh(params)?;
        if refreshed || self.inner.len() < before {
            self.persist();
        }
        Ok(refreshed)
    }

    /// Clears memory and removes the durable key entirely.
    pub fn clear(&mut self) {
        self.inner.clear();
        if let Err(e) = self.storage.remove_item(&self.storage_key) {
            self.inner.log(
                LogLevel::Warn,
                EVENT_PERSIST_FAILED,
                Some(json!({ "operation": "remove", "error": e.to_string() })),
            );
        }
    }

    pub fn cleanup_expired(&mut self) -> usize {
        let removed = self.inner.cleanup_expired();
        if removed > 0 {
            self.persist();
        }
        removed
    }

    /// Discards the in-memory entries and reloads them from durable storage.
    pub fn reload_from_storage(&mut self) {
        self.inner.discard_all();
        self.load();
    }

    // == Load ==
    fn load(&mut self) {
        let raw = match self.storage.get_item(&self.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                self.inner.log(
                    LogLevel::Warn,
                    EVENT_PERSIST_FAILED,
                    Some(json!({ "operation": "read", "error": e.to_string() })),
                );
                return;
            }
        };

        let envelope = match parse_envelope::<T>(&raw) {
            Ok(envelope) => envelope,
            Err(reason) => {
                self.discard_stored(reason);
                return;
            }
        };

        let mut persisted: Vec<(String, PersistedEntry<T>)> = envelope.cache.into_iter().collect();
        persisted.sort_by_key(|(_, entry)| entry.timestamp);
        let stored = persisted.len();

        for (key, item) in persisted {
            if let Some(entry) = CacheEntry::from_parts(item.data, item.timestamp, item.expires_at) {
                self.inner.restore(CacheKey::from(key), entry);
            }
        }

        // Expired entries and entries evicted by later restores both count as dropped.
        let restored = self.inner.len();
        let dropped = stored.saturating_sub(restored);
        self.inner.log(
            LogLevel::Info,
            EVENT_RESTORED,
            Some(json!({ "restored": restored, "dropped": dropped })),
        );
        if dropped > 0 {
            self.persist();
        }
    }

    fn discard_stored(&mut self, reason: Corruption) {
        self.inner.log(
            LogLevel::Warn,
            EVENT_CORRUPTED,
            Some(json!({ "key": self.storage_key, "reason": reason.as_str() })),
        );
        if let Err(e) = self.storage.remove_item(&self.storage_key) {
            self.inner.log(
                LogLevel::Warn,
                EVENT_PERSIST_FAILED,
                Some(json!({ "operation": "remove", "error": e.to_string() })),
            );
        }
    }

    // == Persist ==
    fn persist(&mut self) {
        let serialized = {
            let now = self.inner.now();
            let config = self.inner.config();
            let cache: BTreeMap<String, PersistedEntry<&T>> = self
                .inner
                .iter_entries()
                .map(|(key, entry)| {
                    (
                        key.as_str().to_string(),
                        PersistedEntry {
                            data: &entry.value,
                            timestamp: entry.created_at,
                            expires_at: entry.expires_at,
                        },
                    )
                })
                .collect();
            let envelope = PersistedEnvelope {
                version: STORAGE_VERSION.to_string(),
                timestamp: now,
                metadata: EnvelopeMetadata {
                    entries: cache.len(),
                    ttl: config.ttl_ms,
                    max_size: config.max_size,
                },
                cache,
            };
            serde_json::to_string(&envelope)
        };

        let payload = match serialized {
            Ok(payload) => payload,
            Err(e) => {
                self.inner.log(
                    LogLevel::Warn,
                    EVENT_PERSIST_FAILED,
                    Some(json!({ "operation": "serialize", "error": e.to_string() })),
                );
                return;
            }
        };

        if payload.len() > self.max_persisted_bytes {
            self.inner.log(
                LogLevel::Warn,
                EVENT_PERSIST_SKIPPED,
                Some(json!({ "bytes": payload.len(), "limit": self.max_persisted_bytes })),
            );
            return;
        }

        self.write(&payload);
    }

    fn write(&mut self, payload: &str) {
        let err = match self.storage.set_item(&self.storage_key, payload) {
            Ok(()) => {
                self.inner.log(
                    LogLevel::Debug,
                    EVENT_PERSISTED,
                    Some(json!({ "bytes": payload.len() })),
                );
                return;
            }
            Err(e) => e,
        };

        let err = match err {
            StorageError::QuotaExceeded(_) => {
                let freed = self.free_sibling_space();
                if freed.is_empty() {
                    err
                } else {
                    match self.storage.set_item(&self.storage_key, payload) {
                        Ok(()) => {
                            self.inner.log(
                                LogLevel::Info,
                                EVENT_PERSISTED,
                                Some(json!({ "bytes": payload.len(), "after_recovery": true })),
                            );
                            return;
                        }
                        Err(e) => e,
                    }
                }
            }
            other => other,
        };

        self.inner.log(
            LogLevel::Warn,
            EVENT_PERSIST_FAILED,
            Some(json!({ "operation": "write", "error": err.to_string() })),
        );
    }

    /// Removes up to three other caches' durable keys. Returns the keys removed.
    fn free_sibling_space(&mut self) -> Vec<String> {
        let candidates: Vec<String> = match self.storage.keys() {
            Ok(keys) => keys
                .into_iter()
                .filter(|k| k != &self.storage_key && k.contains(SIBLING_MARKER))
                .take(MAX_SIBLING_EVICTIONS)
                .collect(),
            Err(_) => Vec::new(),
        };

        let removed: Vec<String> = candidates
            .into_iter()
            .filter(|k| self.storage.remove_item(k).is_ok())
            .collect();

        self.inner.log(
            LogLevel::Warn,
            EVENT_QUOTA_RECOVERY,
            Some(json!({ "removed": removed })),
        );
        removed
    }
}

/// Parses and validates a stored envelope.
fn parse_envelope<T: DeserializeOwned>(raw: &str) -> std::result::Result<PersistedEnvelope<T>, Corruption> {
    let value: Value = serde_json::from_str(raw).map_err(|_| Corruption::Parse)?;

    let shape_ok = value.get("version").is_some_and(Value::is_string)
        && value.get("timestamp").is_some_and(Value::is_number)
        && value.get("cache").is_some_and(Value::is_object);
    if !shape_ok {
        return Err(Corruption::Shape);
    }
    if value.get("version").and_then(Value::as_str) != Some(STORAGE_VERSION) {
        return Err(Corruption::Version);
    }

    // Older writers may omit metadata; it is informational only.
    let mut value = value;
    if let Value::Object(map) = &mut value {
        map.entry("metadata")
            .or_insert_with(|| json!({ "entries": 0, "ttl": 0, "maxSize": 0 }));
    }

    let envelope: PersistedEnvelope<T> =
        serde_json::from_value(value).map_err(|_| Corruption::Entries)?;
    if envelope
        .cache
        .values()
        .any(|entry| entry.expires_at < entry.timestamp)
    {
        return Err(Corruption::Entries);
    }
    Ok(envelope)
}

impl<T, S> ResponseCache<T> for PersistentCache<T, S>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync,
    S: DurableStorage,
{
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn get_observed(&mut self, params: &CacheParams, latency_ms: Option<u64>) -> Result<Option<T>> {
        PersistentCache::get_observed(self, params, latency_ms)
    }

    fn observe_latency(&mut self, params: &CacheParams, latency_ms: u64) -> Result<()> {
        self.inner.observe_latency(params, latency_ms)
    }

    fn set(&mut self, params: &CacheParams, value: T) -> Result<bool> {
        PersistentCache::set(self, params, value)
    }

    fn delete(&mut self, params: &CacheParams) -> Result<bool> {
        PersistentCache::delete(self, params)
    }

    fn refresh(&mut self, params: &CacheParams) -> Result<bool> {
        PersistentCache::refresh(self, params)
    }

    fn clear(&mut self) {
        PersistentCache::clear(self)
    }

    fn force_cleanup(&mut self) -> usize {
        self.cleanup_expired()
    }

    fn decay(&mut self) -> usize {
        self.inner.decay()
    }

    fn stats(&self) -> CacheStats {
        self.inner.stats()
    }

    fn metrics(&mut self) -> CacheMetrics {
        self.inner.metrics()
    }

    fn logs(&self, limit: usize) -> Vec<CacheLog> {
        self.inner.logs(limit)
    }

    fn alerts(&self) -> Vec<CacheAlert> {
        self.inner.alerts()
    }

    fn force_activate(&mut self) -> bool {
        self.inner.force_activate()
    }

    fn force_deactivate(&mut self) -> bool {
        self.inner.force_deactivate()
    }

    fn is_persistent(&self) -> bool {
        true
    }

    fn reload_from_storage(&mut self) -> bool {
        PersistentCache::reload_from_storage(self);
        true
    }
}
