//! Error type definitions.
//!
//! This module defines all error types used throughout the service, plus the
//! coarse [`ErrorKind`] classification callers use to decide how to react.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use reqwest::StatusCode;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client used for origin fetches.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// Error opening the database or provisioning its schema.
    #[error("Database initialization error: {0}")]
    DatabaseError(#[from] DatabaseError),

    /// The configuration file could not be read, parsed or validated.
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

/// Error types for configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        /// Path that was read
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for the expected shape.
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration parsed but holds an unusable value.
    #[error(transparent)]
    Invalid(#[from] ConfigValidationError),
}

/// A single invalid configuration field.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid configuration for '{field}': {message}")]
pub struct ConfigValidationError {
    /// Dotted path of the offending field (e.g. `assistance.max_distance`)
    pub field: &'static str,
    /// What is wrong and what is expected instead
    pub message: String,
}

/// Failure of a single origin server request, or of the origin list as a whole.
#[derive(Error, Debug)]
pub enum OriginError {
    /// Network-level failure: connect, timeout, body read.
    #[error("origin request failed: {0}")]
    Request(#[from] ReqwestError),

    /// The origin answered with something other than 200 OK.
    #[error("bad response from {url}: {status}")]
    BadStatus {
        /// URL that was requested
        url: String,
        /// Status code returned
        status: StatusCode,
    },

    /// There was nothing to try.
    #[error("no origin servers configured")]
    NoServers,
}

/// Errors returned by the public service operations.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The component was used before its store or client was wired up.
    #[error("{0} service not initialized")]
    NotInitialized(&'static str),

    /// A caller-supplied value is out of range or unsupported.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A place was saved, deleted or queried without a group.
    #[error("empty group id")]
    MissingGroup,

    /// The requested key does not exist.
    #[error("not found")]
    NotFound,

    /// Every configured origin server failed; carries the last server's error.
    #[error("all {attempts} origin server(s) failed: {source}")]
    OriginUnavailable {
        /// Number of servers attempted
        attempts: usize,
        /// Error from the last server attempted
        #[source]
        source: OriginError,
    },

    /// The store returned an error on read or write.
    #[error("store failure: {0}")]
    StoreFailure(#[from] sqlx::Error),

    /// A stored document could not be encoded or decoded.
    #[error("store document error: {0}")]
    DocumentFailure(#[from] serde_json::Error),
}

impl ServiceError {
    /// Classifies this error into one of the service-level error kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::NotInitialized(_) => ErrorKind::NotInitialized,
            ServiceError::InvalidArgument(_) | ServiceError::MissingGroup => {
                ErrorKind::InvalidArgument
            }
            ServiceError::NotFound => ErrorKind::NotFound,
            ServiceError::OriginUnavailable { .. } => ErrorKind::OriginUnavailable,
            ServiceError::StoreFailure(_) | ServiceError::DocumentFailure(_) => {
                ErrorKind::StoreFailure
            }
        }
    }
}

/// Coarse classification of [`ServiceError`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorKind {
    /// A component was used before it was wired up
    NotInitialized,
    /// Bad coordinates, empty keys or an unsupported circle
    InvalidArgument,
    /// The key does not exist
    NotFound,
    /// Every origin server failed
    OriginUnavailable,
    /// The store failed to read or write
    StoreFailure,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorKind {
    /// Human-readable name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotInitialized => "Service not initialized",
            ErrorKind::InvalidArgument => "Invalid argument",
            ErrorKind::NotFound => "Not found",
            ErrorKind::OriginUnavailable => "Origin unavailable",
            ErrorKind::StoreFailure => "Store failure",
        }
    }
}
