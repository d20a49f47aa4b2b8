//! Request DTOs for the cache diagnostic API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::CacheParams;
use crate::error::Result;

/// Request body for a lookup (POST /caches/:name/lookup)
///
/// # Fields
/// - `params`: The request parameters the value was fetched with
/// - `latency_ms`: Optional last observed round-trip for these params
#[derive(Debug, Clone, Deserialize)]
pub struct LookupRequest {
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub latency_ms: Option<u64>,
}

impl LookupRequest {
    pub fn cache_params(&self) -> Result<CacheParams> {
        CacheParams::from_json(&self.params)
    }
}

/// Request body for storing a value (PUT /caches/:name/entries)
#[derive(Debug, Clone, Deserialize)]
pub struct StoreRequest {
    #[serde(default)]
    pub params: Value,
    /// The response payload to cache
    pub value: Value,
}

impl StoreRequest {
    pub fn cache_params(&self) -> Result<CacheParams> {
        CacheParams::from_json(&self.params)
    }
}

/// Request body naming one entry (DELETE /caches/:name/entries, POST /caches/:name/refresh)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParamsRequest {
    #[serde(default)]
    pub params: Value,
}

impl ParamsRequest {
    pub fn cache_params(&self) -> Result<CacheParams> {
        CacheParams::from_json(&self.params)
    }
}

/// Query string for GET /caches/:name/logs
#[derive(Debug, Clone, Deserialize)]
pub struct LogsQuery {
    #[serde(default = "default_log_limit")]
    pub limit: usize,
}

fn default_log_limit() -> usize {
    100
}

impl Default for LogsQuery {
    fn default() -> Self {
        Self {
            limit: default_log_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;

    #[test]
    fn test_lookup_request_deserialize() {
        let json = r#"{"params": {"level": "N2", "limit": 10}, "latency_ms": 250}"#;
        let req: LookupRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.latency_ms, Some(250));
        assert_eq!(req.cache_params().unwrap().len(), 2);
    }

    #[test]
    fn test_lookup_request_without_params() {
        let req: LookupRequest = serde_json::from_str("{}").unwrap();
        assert!(req.latency_ms.is_none());
        assert!(req.cache_params().unwrap().is_empty());
    }

    #[test]
    fn test_store_request_requires_value() {
        assert!(serde_json::from_str::<StoreRequest>(r#"{"params": {}}"#).is_err());

        let req: StoreRequest =
            serde_json::from_str(r#"{"params": {"limit": 5}, "value": [1, 2]}"#).unwrap();
        assert_eq!(req.value, serde_json::json!([1, 2]));
    }

    #[test]
    fn test_non_object_params_rejected() {
        let req: ParamsRequest = serde_json::from_str(r#"{"params": [1, 2]}"#).unwrap();
        assert!(matches!(req.cache_params(), Err(CacheError::InvalidRequest(_))));
    }

    #[test]
    fn test_logs_query_default_limit() {
        let query: LogsQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.limit, 100);
    }
}
