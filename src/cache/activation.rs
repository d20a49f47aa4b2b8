//! Activation Heuristic Module
//!
//! Decides when an auto-activating cache starts storing and serving entries.
//! A cache goes active the first time one observed latency reaches the
//! performance threshold or one key's request count reaches the usage
//! threshold. The heuristic never reverts on its own.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use crate::cache::CacheKey;
use crate::config::CacheConfig;

/// Latency samples kept per key.
pub const LATENCY_SAMPLES_PER_KEY: usize = 10;

/// Keys beyond this many are not tracked.
const MAX_TRACKED_KEYS: usize = 1000;

// == Trigger ==
/// What switched the cache on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Trigger {
    Latency { latency_ms: u64, threshold_ms: u64 },
    Usage { requests: u64, threshold: u64 },
}

#[derive(Debug, Default)]
struct KeyUsage {
    latencies: VecDeque<u64>,
    requests: u64,
}

// == Activation Heuristic ==
#[derive(Debug)]
pub struct ActivationHeuristic {
    auto_activate: bool,
    active: bool,
    performance_threshold_ms: u64,
    usage_threshold: u64,
    usage: HashMap<CacheKey, KeyUsage>,
}

impl ActivationHeuristic {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            auto_activate: config.auto_activate,
            active: !config.auto_activate,
            performance_threshold_ms: config.performance_threshold_ms,
            usage_threshold: config.usage_threshold,
            usage: HashMap::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn auto_activate(&self) -> bool {
        self.auto_activate
    }

    /// Counts a lookup for `key`. Returns the trigger if this activated the cache.
    pub fn record_request(&mut self, key: &CacheKey) -> Option<Trigger> {
        let requests = {
            let usage = self.usage_mut(key)?;
            usage.requests += 1;
            usage.requests
        };

        if self.can_trigger() && requests >= self.usage_threshold {
            self.active = true;
            return Some(Trigger::Usage {
                requests,
                threshold: self.usage_threshold,
            });
        }
        None
    }

    /// Records a round-trip latency for `key`. Returns the trigger if this activated the cache.
    pub fn record_latency(&mut self, key: &CacheKey, latency_ms: u64) -> Option<Trigger> {
        if let Some(usage) = self.usage_mut(key) {
            if usage.latencies.len() == LATENCY_SAMPLES_PER_KEY {
                usage.latencies.pop_front();
            }
            usage.latencies.push_back(latency_ms);
        }

        if self.can_trigger() && latency_ms >= self.performance_threshold_ms {
            self.active = true;
            return Some(Trigger::Latency {
                latency_ms,
                threshold_ms: self.performance_threshold_ms,
            });
        }
        None
    }

    /// Mean of all retained latency samples, or 0.0 with none.
    pub fn avg_response_time_ms(&self) -> f64 {
        let (sum, count) = self
            .usage
            .values()
            .flat_map(|u| u.latencies.iter())
            .fold((0u64, 0u64), |(sum, count), &ms| (sum.saturating_add(ms), count + 1));
        if count == 0 {
            0.0
        } else {
            sum as f64 / count as f64
        }
    }

    /// Request count seen so far for `key`.
    pub fn requests_for(&self, key: &CacheKey) -> u64 {
        self.usage.get(key).map_or(0, |u| u.requests)
    }

    /// Returns true if the state changed.
    pub fn force_activate(&mut self) -> bool {
        let changed = !self.active;
        self.active = true;
        changed
    }

    /// Puts the cache back to inert and forgets all samples.
    ///
    /// Returns true if the state changed.
    pub fn force_deactivate(&mut self) -> bool {
        let changed = self.active;
        self.active = false;
        self.usage.clear();
        changed
    }

    fn can_trigger(&self) -> bool {
        self.auto_activate && !self.active
    }

    fn usage_mut(&mut self, key: &CacheKey) -> Option<&mut KeyUsage> {
        if !self.usage.contains_key(key) && self.usage.len() >= MAX_TRACKED_KEYS {
            return None;
        }
        Some(self.usage.entry(key.clone()).or_default())
    }
}
