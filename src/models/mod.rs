//! Request and Response models for the cache diagnostic API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{LogsQuery, LookupRequest, ParamsRequest, StoreRequest};
pub use responses::{
    CacheListResponse, CacheSummary, ErrorResponse, HealthResponse, LookupResponse,
    MutationResponse,
};
