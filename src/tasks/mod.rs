//! Background Tasks Module
//!
//! Periodic maintenance that runs for the lifetime of the server.
//!
//! # Tasks
//! - Expiration sweep: removes expired entries from every cache
//! - Decay: purges aged log records and alerts

mod maintenance;

pub use maintenance::{spawn_decay_task, spawn_maintenance, spawn_sweep_task, MaintenanceHandles};
