//! HTTP client initialization.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

/// User-Agent sent to the assistance origins.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Initializes the HTTP client shared by every origin request.
///
/// Creates a `reqwest::Client` configured with:
/// - a per-request timeout, applied to each origin attempt separately
/// - a crate-identifying User-Agent
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_origin_client(timeout: Duration) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(Arc::new(client))
}
