//! Configuration Module
//!
//! Per-cache configuration plus the binary's environment-driven settings.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cache::{DECAY_INTERVAL_SECS, SWEEP_INTERVAL_SECS};

/// Default entry lifetime: 5 minutes.
pub const DEFAULT_TTL_MS: u64 = 5 * 60 * 1000;
/// Default hard cap on concurrent entries.
pub const DEFAULT_MAX_SIZE: usize = 100;
/// Default latency that activates an auto-activating cache.
pub const DEFAULT_PERFORMANCE_THRESHOLD_MS: u64 = 1000;
/// Default per-key request count that activates an auto-activating cache.
pub const DEFAULT_USAGE_THRESHOLD: u64 = 5;
/// Default window after which alerts are purged.
pub const DEFAULT_ALERT_RETENTION_MS: u64 = 60 * 60 * 1000;

// == Cache Config ==
/// Settings for a single cache instance. Immutable once the cache is built.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Lifetime granted to every entry, in milliseconds
    pub ttl_ms: u64,
    /// Maximum number of concurrent entries
    pub max_size: usize,
    /// Start inert and only cache once the activation heuristic fires
    pub auto_activate: bool,
    /// A single observed latency at or above this activates the cache
    pub performance_threshold_ms: u64,
    /// A per-key request count at or above this activates the cache
    pub usage_threshold: u64,
    /// Alerts older than this are purged on decay
    pub alert_retention_ms: u64,
}

impl CacheConfig {
    pub fn new(ttl_ms: u64, max_size: usize) -> Self {
        Self {
            ttl_ms,
            max_size,
            ..Self::default()
        }
    }

    pub fn with_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Enables deferred activation with the given thresholds.
    pub fn with_auto_activate(mut self, performance_threshold_ms: u64, usage_threshold: u64) -> Self {
        self.auto_activate = true;
        self.performance_threshold_ms = performance_threshold_ms;
        self.usage_threshold = usage_threshold;
        self
    }

    pub fn with_alert_retention_ms(mut self, alert_retention_ms: u64) -> Self {
        self.alert_retention_ms = alert_retention_ms;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: DEFAULT_TTL_MS,
            max_size: DEFAULT_MAX_SIZE,
            auto_activate: false,
            performance_threshold_ms: DEFAULT_PERFORMANCE_THRESHOLD_MS,
            usage_threshold: DEFAULT_USAGE_THRESHOLD,
            alert_retention_ms: DEFAULT_ALERT_RETENTION_MS,
        }
    }
}

// == Server Config ==
/// Binary configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP port for the diagnostic surface
    pub server_port: u16,
    /// Directory backing the durable caches
    pub storage_dir: PathBuf,
    /// Default entry TTL in milliseconds
    pub default_ttl_ms: u64,
    /// Default maximum entries per cache
    pub max_entries: usize,
    /// Expiration sweep interval in seconds
    pub sweep_interval: u64,
    /// Log and alert decay interval in seconds
    pub decay_interval: u64,
    /// Alert retention window in seconds
    pub alert_retention: u64,
    /// Whether the dashboard caches persist to `storage_dir`
    pub persist: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `STORAGE_DIR` - Durable storage directory (default: `.dash_cache`)
    /// - `DEFAULT_TTL_MS` - Entry TTL in milliseconds (default: 300000)
    /// - `MAX_ENTRIES` - Maximum entries per cache (default: 100)
    /// - `SWEEP_INTERVAL_SECS` - Expiration sweep frequency (default: 60)
    /// - `DECAY_INTERVAL_SECS` - Log/alert decay frequency (default: 3600)
    /// - `ALERT_RETENTION_SECS` - Alert retention window (default: 3600)
    /// - `PERSIST` - Persist dashboard caches (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            storage_dir: env::var("STORAGE_DIR")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            default_ttl_ms: env_or("DEFAULT_TTL_MS", defaults.default_ttl_ms),
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            sweep_interval: env_or("SWEEP_INTERVAL_SECS", defaults.sweep_interval),
            decay_interval: env_or("DECAY_INTERVAL_SECS", defaults.decay_interval),
            alert_retention: env_or("ALERT_RETENTION_SECS", defaults.alert_retention),
            persist: env_or("PERSIST", defaults.persist),
        }
    }

    /// Base per-cache settings derived from this configuration.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new(self.default_ttl_ms, self.max_entries)
            .with_alert_retention_ms(self.alert_retention * 1000)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            storage_dir: PathBuf::from(".dash_cache"),
            default_ttl_ms: DEFAULT_TTL_MS,
            max_entries: DEFAULT_MAX_SIZE,
            sweep_interval: SWEEP_INTERVAL_SECS,
            decay_interval: DECAY_INTERVAL_SECS,
            alert_retention: DEFAULT_ALERT_RETENTION_MS / 1000,
            persist: true,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
