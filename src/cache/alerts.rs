//! Cache Alerts Module
//!
//! Threshold alerts raised by metrics computation, kept in a capped buffer
//! that is also purged by age.

use std::collections::VecDeque;

use serde::Serialize;

/// Maximum number of alerts retained.
pub const MAX_ALERTS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    LowHitRate,
    SlowResponse,
    StaleData,
    NearCapacity,
    HighInvalidation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

// == Cache Alert ==
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheAlert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    /// Unix milliseconds
    pub timestamp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

impl CacheAlert {
    pub fn new(kind: AlertKind, severity: Severity, message: impl Into<String>, timestamp: u64) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            timestamp,
            value: None,
            threshold: None,
        }
    }

    pub fn with_measure(mut self, value: f64, threshold: f64) -> Self {
        self.value = Some(value);
        self.threshold = Some(threshold);
        self
    }
}

// == Alert Buffer ==
/// Append-only ring of the most recent alerts.
#[derive(Debug)]
pub struct AlertBuffer {
    alerts: VecDeque<CacheAlert>,
    capacity: usize,
}

impl AlertBuffer {
    pub fn new() -> Self {
        Self::with_capacity(MAX_ALERTS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            alerts: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an alert, dropping the oldest when full.
    pub fn push(&mut self, alert: CacheAlert) {
        if self.capacity == 0 {
            return;
        }
        while self.alerts.len() >= self.capacity {
            self.alerts.pop_front();
        }
        self.alerts.push_back(alert);
    }

    /// Removes alerts older than `retention_ms` before `now`. Returns how many went.
    pub fn decay(&mut self, now: u64, retention_ms: u64) -> usize {
        let cutoff = now.saturating_sub(retention_ms);
        let before = self.alerts.len();
        self.alerts.retain(|a| a.timestamp >= cutoff);
        before - self.alerts.len()
    }

    /// All retained alerts, oldest first.
    pub fn snapshot(&self) -> Vec<CacheAlert> {
        self.alerts.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

impl Default for AlertBuffer {
    fn default() -> Self {
        Self::new()
    }
}
