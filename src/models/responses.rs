//! Response DTOs for the cache diagnostic API
//!
//! Defines the structure of outgoing HTTP response bodies. Stats, metrics,
//! logs and alerts are served as the cache module's own types.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;

/// Response body for a lookup hit (POST /caches/:name/lookup)
#[derive(Debug, Clone, Serialize)]
pub struct LookupResponse {
    pub cache: String,
    /// The encoded cache key
    pub key: String,
    pub value: Value,
}

impl LookupResponse {
    pub fn new(cache: impl Into<String>, key: impl Into<String>, value: Value) -> Self {
        Self {
            cache: cache.into(),
            key: key.into(),
            value,
        }
    }
}

/// Response body for operations that change a cache
#[derive(Debug, Clone, Serialize)]
pub struct MutationResponse {
    pub cache: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Whether the operation changed anything
    pub applied: bool,
    pub message: String,
}

impl MutationResponse {
    pub fn new(cache: impl Into<String>, applied: bool, message: impl Into<String>) -> Self {
        Self {
            cache: cache.into(),
            key: None,
            applied,
            message: message.into(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// One cache in the GET /caches listing
#[derive(Debug, Clone, Serialize)]
pub struct CacheSummary {
    pub name: String,
    pub persistent: bool,
    pub stats: CacheStats,
}

/// Response body for GET /caches
#[derive(Debug, Clone, Serialize)]
pub struct CacheListResponse {
    pub caches: Vec<CacheSummary>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    pub caches: usize,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(caches: usize) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            caches,
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
