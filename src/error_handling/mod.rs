//! Error handling.
//!
//! This module provides the error enums for initialization, configuration,
//! origin fetches and the public service operations. Service errors are
//! classified into:
//! - **NotInitialized**: a component was used before it was wired up
//! - **InvalidArgument**: bad coordinates, empty keys, unsupported circles
//! - **NotFound**: absent key (a miss for reads, success for deletes)
//! - **OriginUnavailable**: every origin server failed
//! - **StoreFailure**: the document store returned an error

mod types;

// Re-export public API
pub use types::{
    ConfigError, ConfigValidationError, DatabaseError, ErrorKind, InitializationError,
    OriginError, ServiceError,
};
