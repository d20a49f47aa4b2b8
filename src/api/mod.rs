//! API Module
//!
//! HTTP handlers and routing for the cache diagnostic REST API. Every route
//! below `/caches/:name` addresses one cache in the registry.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
