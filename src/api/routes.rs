//! API Routes
//!
//! Configures the Axum router with the cache diagnostic endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    activate_handler, alerts_handler, cleanup_handler, clear_handler, deactivate_handler,
    delete_entry_handler, health_handler, list_caches_handler, logs_handler, lookup_handler,
    metrics_handler, refresh_handler, reload_handler, stats_handler, store_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check
/// - `GET /caches` - Every cache with its statistics
/// - `DELETE /caches/:name` - Clear a cache
/// - `POST /caches/:name/lookup` - Look up a value by request params
/// - `PUT /caches/:name/entries` - Store a value
/// - `DELETE /caches/:name/entries` - Delete a value
/// - `POST /caches/:name/refresh` - Restart an entry's TTL
/// - `GET /caches/:name/stats`, `/metrics`, `/logs`, `/alerts` - Observability
/// - `POST /caches/:name/cleanup` - Run the expiration sweep now
/// - `POST /caches/:name/activate`, `/deactivate` - Operator overrides
/// - `POST /caches/:name/reload` - Rebuild a persistent cache from storage
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/caches", get(list_caches_handler))
        .route("/caches/:name", delete(clear_handler))
        .route("/caches/:name/lookup", post(lookup_handler))
        .route(
            "/caches/:name/entries",
            put(store_handler).delete(delete_entry_handler),
        )
        .route("/caches/:name/refresh", post(refresh_handler))
        .route("/caches/:name/stats", get(stats_handler))
        .route("/caches/:name/metrics", get(metrics_handler))
        .route("/caches/:name/logs", get(logs_handler))
        .route("/caches/:name/alerts", get(alerts_handler))
        .route("/caches/:name/cleanup", post(cleanup_handler))
        .route("/caches/:name/activate", post(activate_handler))
        .route("/caches/:name/deactivate", post(deactivate_handler))
        .route("/caches/:name/reload", post(reload_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
