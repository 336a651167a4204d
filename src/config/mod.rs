//! Service configuration and constants.
//!
//! This module provides:
//! - Configuration constants (geometry, origin protocol, timeouts)
//! - The JSON configuration file types and their validation
//! - Logging option enums shared with the CLI

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{AssistanceConfig, Config, GeofenceConfig, LogFormat, LogLevel};
