//! Cache Module
//!
//! Response caching for dashboard API calls: deterministic parameter keys,
//! TTL expiration, FIFO eviction, usage-driven activation, metrics, alerts,
//! a structured event log, and optional durable persistence.

mod activation;
mod alerts;
mod clock;
mod entry;
mod fifo;
mod key;
pub mod log;
mod metrics;
mod persistent;
mod stats;
mod store;
mod traits;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use activation::{ActivationHeuristic, Trigger, LATENCY_SAMPLES_PER_KEY};
pub use alerts::{AlertBuffer, AlertKind, CacheAlert, Severity, MAX_ALERTS};
pub use clock::{current_timestamp_ms, Clock, ManualClock, SharedClock, SystemClock};
pub use entry::CacheEntry;
pub use fifo::FifoTracker;
pub use key::{encode, CacheKey, CacheParams, ParamValue};
pub use log::{CacheLog, CacheLogger, LogLevel};
pub use metrics::{performance_score, CacheMetrics};
pub use persistent::{
    EnvelopeMetadata, PersistedEntry, PersistedEnvelope, PersistentCache, MAX_PERSISTED_BYTES,
    STORAGE_VERSION,
};
pub use stats::{CacheStats, InvalidationWindow, INVALIDATION_WINDOW_MS};
pub use store::CacheStore;
pub use traits::ResponseCache;

// == Public Constants ==
/// Interval of the expiration sweep, in seconds.
pub const SWEEP_INTERVAL_SECS: u64 = 60;

/// Interval of the log and alert decay pass, in seconds.
pub const DECAY_INTERVAL_SECS: u64 = 60 * 60;
