//! API Handlers
//!
//! HTTP request handlers for the cache diagnostic endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::cache::{CacheAlert, CacheLog, CacheMetrics, CacheStats};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    CacheListResponse, CacheSummary, HealthResponse, LogsQuery, LookupRequest, LookupResponse,
    MutationResponse, ParamsRequest, StoreRequest,
};
use crate::registry::CacheRegistry;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: CacheRegistry,
}

impl AppState {
    pub fn new(registry: CacheRegistry) -> Self {
        Self { registry }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(CacheRegistry::from_config(config)?))
    }
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.registry.len()))
}

/// Handler for GET /caches
pub async fn list_caches_handler(State(state): State<AppState>) -> Json<CacheListResponse> {
    let mut caches = Vec::with_capacity(state.registry.len());
    for name in state.registry.names() {
        if let Some(cache) = state.registry.get(&name) {
            let cache = cache.read().await;
            caches.push(CacheSummary {
                name,
                persistent: cache.is_persistent(),
                stats: cache.stats(),
            });
        }
    }
    Json(CacheListResponse { caches })
}

/// Handler for POST /caches/:name/lookup
///
/// A miss, including every lookup on an inert cache, is a 404.
pub async fn lookup_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<LookupRequest>,
) -> Result<Json<LookupResponse>> {
    let params = req.cache_params()?;
    let key = params.encode()?;

    let cache = state.registry.require(&name)?;
    // Write lock: lookups update counters and may remove expired entries.
    let value = cache.write().await.get_observed(&params, req.latency_ms)?;

    match value {
        Some(value) => Ok(Json(LookupResponse::new(name, key.into_string(), value))),
        None => Err(CacheError::NotFound(format!(
            "No cached value in '{}' for key '{}'",
            name, key
        ))),
    }
}

/// Handler for PUT /caches/:name/entries
pub async fn store_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<StoreRequest>,
) -> Result<Json<MutationResponse>> {
    let params = req.cache_params()?;
    let key = params.encode()?;

    let cache = state.registry.require(&name)?;
    let stored = cache.write().await.set(&params, req.value)?;

    let message = if stored {
        "Value stored"
    } else {
        "Cache inactive, value not stored"
    };
    Ok(Json(
        MutationResponse::new(name, stored, message).with_key(key.into_string()),
    ))
}

/// Handler for DELETE /caches/:name/entries
pub async fn delete_entry_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<ParamsRequest>,
) -> Result<Json<MutationResponse>> {
    let params = req.cache_params()?;
    let key = params.encode()?;

    let cache = state.registry.require(&name)?;
    let removed = cache.write().await.delete(&params)?;

    let message = if removed { "Entry deleted" } else { "No such entry" };
    Ok(Json(
        MutationResponse::new(name, removed, message).with_key(key.into_string()),
    ))
}

/// Handler for POST /caches/:name/refresh
///
/// Restarts the TTL of a live entry.
pub async fn refresh_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<ParamsRequest>,
) -> Result<Json<MutationResponse>> {
    let params = req.cache_params()?;
    let key = params.encode()?;

    let cache = state.registry.require(&name)?;
    let refreshed = cache.write().await.refresh(&params)?;

    let message = if refreshed {
        "Entry refreshed"
    } else {
        "No live entry to refresh"
    };
    Ok(Json(
        MutationResponse::new(name, refreshed, message).with_key(key.into_string()),
    ))
}

/// Handler for DELETE /caches/:name
pub async fn clear_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MutationResponse>> {
    let cache = state.registry.require(&name)?;
    cache.write().await.clear();
    Ok(Json(MutationResponse::new(name, true, "Cache cleared")))
}

/// Handler for GET /caches/:name/stats
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CacheStats>> {
    let cache = state.registry.require(&name)?;
    let stats = cache.read().await.stats();
    Ok(Json(stats))
}

/// Handler for GET /caches/:name/metrics
///
/// Evaluating metrics may raise alerts, so this takes the write lock.
pub async fn metrics_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CacheMetrics>> {
    let cache = state.registry.require(&name)?;
    let metrics = cache.write().await.metrics();
    Ok(Json(metrics))
}

/// Handler for GET /caches/:name/logs?limit=N
pub async fn logs_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<Vec<CacheLog>>> {
    let cache = state.registry.require(&name)?;
    let logs = cache.read().await.logs(query.limit);
    Ok(Json(logs))
}

/// Handler for GET /caches/:name/alerts
pub async fn alerts_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<CacheAlert>>> {
    let cache = state.registry.require(&name)?;
    let alerts = cache.read().await.alerts();
    Ok(Json(alerts))
}

/// Handler for POST /caches/:name/cleanup
pub async fn cleanup_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MutationResponse>> {
    let cache = state.registry.require(&name)?;
    let removed = cache.write().await.force_cleanup();
    Ok(Json(MutationResponse::new(
        name,
        removed > 0,
        format!("Removed {} expired entries", removed),
    )))
}

/// Handler for POST /caches/:name/activate
pub async fn activate_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MutationResponse>> {
    let cache = state.registry.require(&name)?;
    let changed = cache.write().await.force_activate();
    let message = if changed { "Cache activated" } else { "Cache already active" };
    Ok(Json(MutationResponse::new(name, changed, message)))
}

/// Handler for POST /caches/:name/deactivate
pub async fn deactivate_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MutationResponse>> {
    let cache = state.registry.require(&name)?;
    let changed = cache.write().await.force_deactivate();
    let message = if changed { "Cache deactivated" } else { "Cache already inactive" };
    Ok(Json(MutationResponse::new(name, changed, message)))
}

/// Handler for POST /caches/:name/reload
pub async fn reload_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MutationResponse>> {
    let cache = state.registry.require(&name)?;
    if !cache.write().await.reload_from_storage() {
        return Err(CacheError::InvalidRequest(format!(
            "Cache '{}' is not persistent",
            name
        )));
    }
    Ok(Json(MutationResponse::new(name, true, "Reloaded from storage")))
}
