//! Cache Metrics Module
//!
//! Derived performance figures, the composite 0-100 score, and the alert rules
//! evaluated after every metrics computation.

use serde::Serialize;

use crate::cache::{AlertKind, CacheAlert, CacheStats, Severity};

const HIT_RATE_WEIGHT: f64 = 40.0;
const STALENESS_WEIGHT: f64 = 30.0;
const CHURN_WEIGHT: f64 = 20.0;
const CHURN_SCALE: f64 = 10.0;
const FULLNESS_KNEE: f64 = 0.9;
const FULLNESS_WEIGHT: f64 = 100.0;

const LOW_HIT_RATE: f64 = 0.5;
const CRITICAL_HIT_RATE: f64 = 0.3;
const MIN_REQUESTS_FOR_HIT_RATE: u64 = 10;
const SLOW_RESPONSE_MS: f64 = 1000.0;
const CRITICAL_RESPONSE_MS: f64 = 2000.0;
const STALE_DATA_MS: f64 = 15.0 * 60.0 * 1000.0;
const HIGH_FULLNESS: f64 = 0.9;
const CRITICAL_FULLNESS: f64 = 0.95;
const HIGH_INVALIDATION: f64 = 10.0;
const CRITICAL_INVALIDATION: f64 = 20.0;

// == Cache Metrics ==
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CacheMetrics {
    pub hit_rate: f64,
    pub miss_rate: f64,
    /// Mean observed round-trip latency, milliseconds
    pub avg_response_time: f64,
    /// Mean age of live entries, milliseconds
    pub avg_data_age: f64,
    /// Delete, expire and clear events in the last minute
    pub invalidation_frequency: u64,
    pub cache_size: usize,
    pub max_size: usize,
    pub total_requests: u64,
    pub performance_score: f64,
    pub alerts: Vec<CacheAlert>,
}

impl CacheMetrics {
    /// Derives metrics from counters and current measurements.
    pub fn compute(
        stats: &CacheStats,
        avg_response_time: f64,
        avg_data_age: f64,
        invalidation_frequency: u64,
    ) -> Self {
        let hit_rate = stats.hit_rate();
        let performance_score = performance_score(
            hit_rate,
            avg_data_age,
            stats.ttl_ms,
            invalidation_frequency,
            fullness(stats.total_entries, stats.max_size),
        );

        Self {
            hit_rate,
            miss_rate: stats.miss_rate(),
            avg_response_time,
            avg_data_age,
            invalidation_frequency,
            cache_size: stats.total_entries,
            max_size: stats.max_size,
            total_requests: stats.total_requests(),
            performance_score,
            alerts: Vec::new(),
        }
    }

    pub fn fullness(&self) -> f64 {
        fullness(self.cache_size, self.max_size)
    }

    /// Applies the alert rules to these metrics.
    pub fn evaluate_alerts(&self, now: u64) -> Vec<CacheAlert> {
        let mut alerts = Vec::new();

        if self.hit_rate < LOW_HIT_RATE && self.total_requests > MIN_REQUESTS_FOR_HIT_RATE {
            let severity = if self.hit_rate < CRITICAL_HIT_RATE {
                Severity::High
            } else {
                Severity::Medium
            };
            alerts.push(
                CacheAlert::new(
                    AlertKind::LowHitRate,
                    severity,
                    format!("Low cache hit rate: {:.1}%", self.hit_rate * 100.0),
                    now,
                )
                .with_measure(self.hit_rate, LOW_HIT_RATE),
            );
        }

        if self.avg_response_time > SLOW_RESPONSE_MS {
            let severity = if self.avg_response_time > CRITICAL_RESPONSE_MS {
                Severity::High
            } else {
                Severity::Medium
            };
            alerts.push(
                CacheAlert::new(
                    AlertKind::SlowResponse,
                    severity,
                    format!("Slow response time: {:.0}ms", self.avg_response_time),
                    now,
                )
                .with_measure(self.avg_response_time, SLOW_RESPONSE_MS),
            );
        }

        if self.avg_data_age > STALE_DATA_MS {
            alerts.push(
                CacheAlert::new(
                    AlertKind::StaleData,
                    Severity::Medium,
                    format!("Stale cached data: average age {:.1} min", self.avg_data_age / 60_000.0),
                    now,
                )
                .with_measure(self.avg_data_age, STALE_DATA_MS),
            );
        }

        let fullness = self.fullness();
        if fullness > HIGH_FULLNESS {
            let severity = if fullness > CRITICAL_FULLNESS {
                Severity::High
            } else {
                Severity::Medium
            };
            alerts.push(
                CacheAlert::new(
                    AlertKind::NearCapacity,
                    severity,
                    format!("Cache nearly full: {:.1}% of capacity", fullness * 100.0),
                    now,
                )
                .with_measure(fullness, HIGH_FULLNESS),
            );
        }

        let churn = self.invalidation_frequency as f64;
        if churn > HIGH_INVALIDATION {
            let severity = if churn > CRITICAL_INVALIDATION {
                Severity::High
            } else {
                Severity::Medium
            };
            alerts.push(
                CacheAlert::new(
                    AlertKind::HighInvalidation,
                    severity,
                    format!("High invalidation rate: {} per minute", self.invalidation_frequency),
                    now,
                )
                .with_measure(churn, HIGH_INVALIDATION),
            );
        }

        alerts
    }
}

// == Performance Score ==
/// Composite health score clamped to `[0, 100]`.
///
/// Deductions: `(1 - hit_rate) * 40`, `min(age / ttl, 1) * 30`,
/// `min(invalidations / 10, 1) * 20`, and `(fullness - 0.9) * 100` once the
/// cache is more than 90% full.
pub fn performance_score(
    hit_rate: f64,
    avg_data_age_ms: f64,
    ttl_ms: u64,
    invalidations_per_minute: u64,
    fullness: f64,
) -> f64 {
    let staleness = if ttl_ms == 0 {
        1.0
    } else {
        (avg_data_age_ms / ttl_ms as f64).min(1.0)
    };
    let churn = (invalidations_per_minute as f64 / CHURN_SCALE).min(1.0);
    let overfill = (fullness - FULLNESS_KNEE).max(0.0);

    let score = 100.0
        - (1.0 - hit_rate) * HIT_RATE_WEIGHT
        - staleness * STALENESS_WEIGHT
        - churn * CHURN_WEIGHT
        - overfill * FULLNESS_WEIGHT;

    score.clamp(0.0, 100.0)
}

fn fullness(size: usize, max_size: usize) -> f64 {
    if max_size == 0 {
        0.0
    } else {
        size as f64 / max_size as f64
    }
}
