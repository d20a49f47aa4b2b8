//! Dash Cache - Response cache for the service-desk dashboard
//!
//! Caches remote API responses keyed by their request parameters, with TTL
//! expiration, FIFO eviction, usage-driven activation, metrics and alerts,
//! and optional durable persistence. A small HTTP surface exposes the caches
//! for inspection.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheParams, CacheStore, PersistentCache, ResponseCache};
pub use config::{CacheConfig, Config};
pub use error::{CacheError, Result};
pub use registry::CacheRegistry;
pub use tasks::{spawn_maintenance, MaintenanceHandles};
