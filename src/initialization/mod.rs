//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the shared resources:
//! - Logger (plain or JSON output)
//! - HTTP client for the assistance origins
//!
//! The database pool lives in `storage`; wiring everything together from a
//! [`Config`](crate::Config) is done by [`LocationService::from_config`](crate::LocationService::from_config).

mod client;
mod logger;

// Re-export public API
pub use client::init_origin_client;
pub use logger::init_logger_with;
