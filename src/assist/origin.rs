//! Multi-origin fetch with sequential failover.
//!
//! Servers are tried strictly in configured order. The first 200 answer wins;
//! any other outcome moves on to the next server. Nothing is retried against
//! the same server and no state survives between calls. If every server fails,
//! only the last server's error is reported.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::StatusCode;

use crate::assist::query::build_query;
use crate::assist::AssistanceProfile;
use crate::error_handling::{OriginError, ServiceError};
use crate::geometry::Point;

/// Source of assistance payloads consulted on a cache miss.
#[async_trait]
pub trait OriginFetcher: Send + Sync {
    /// Fetches the payload for `profile` near `point`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::OriginUnavailable` when no origin produced a payload.
    async fn fetch(&self, point: Point, profile: &AssistanceProfile)
        -> Result<Vec<u8>, ServiceError>;
}

/// Next action of a [`Failover`] walk.
#[derive(Debug)]
pub enum FailoverStep<'a> {
    /// Try this server next.
    Try(&'a str),
    /// No servers remain; carries the error to surface.
    Exhausted(ServiceError),
}

/// State of one failover walk over an ordered server list.
///
/// ```
/// use location_service::{Failover, FailoverStep, OriginError};
///
/// let servers = vec!["http://a".to_string(), "http://b".to_string()];
/// let mut failover = Failover::new(&servers);
/// assert!(matches!(failover.step(), FailoverStep::Try("http://a")));
/// failover.record_failure(OriginError::NoServers);
/// assert!(matches!(failover.step(), FailoverStep::Try("http://b")));
/// failover.record_failure(OriginError::NoServers);
/// assert!(matches!(failover.step(), FailoverStep::Exhausted(_)));
/// ```
#[derive(Debug)]
pub struct Failover<'a> {
    servers: &'a [String],
    next: usize,
    last_error: Option<OriginError>,
}

impl<'a> Failover<'a> {
    /// Starts a walk at the first of `servers`.
    pub fn new(servers: &'a [String]) -> Self {
        Self {
            servers,
            next: 0,
            last_error: None,
        }
    }

    /// Advances to the next server, or reports exhaustion with the last error.
    pub fn step(&mut self) -> FailoverStep<'a> {
        match self.servers.get(self.next) {
            Some(server) => {
                self.next += 1;
                FailoverStep::Try(server)
            }
            None => FailoverStep::Exhausted(ServiceError::OriginUnavailable {
                attempts: self.next,
                source: self.last_error.take().unwrap_or(OriginError::NoServers),
            }),
        }
    }

    /// Records the failure of the server most recently returned by [`Failover::step`].
    pub fn record_failure(&mut self, error: OriginError) {
        self.last_error = Some(error);
    }

    /// Number of servers handed out so far.
    pub fn attempts(&self) -> usize {
        self.next
    }
}

/// HTTP origin servers queried with failover.
pub struct OriginPool {
    client: Arc<reqwest::Client>,
    servers: Vec<String>,
    token: String,
    pacc: u32,
}

impl OriginPool {
    /// Creates a pool over `servers`, in the order they will be tried.
    ///
    /// The client's timeout bounds every single origin call, so one fetch takes
    /// at most timeout × server count.
    pub fn new(
        client: Arc<reqwest::Client>,
        servers: Vec<String>,
        token: impl Into<String>,
        pacc: u32,
    ) -> Self {
        Self {
            client,
            servers,
            token: token.into(),
            pacc,
        }
    }

    async fn get(&self, url: &str) -> Result<Vec<u8>, OriginError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(OriginError::BadStatus {
                url: url.to_string(),
                status,
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl OriginFetcher for OriginPool {
    async fn fetch(
        &self,
        point: Point,
        profile: &AssistanceProfile,
    ) -> Result<Vec<u8>, ServiceError> {
        let query = build_query(&self.token, self.pacc, point, profile);
        let mut failover = Failover::new(&self.servers);
        loop {
            match failover.step() {
                FailoverStep::Try(server) => {
                    debug!("Requesting assistance data from {server}");
                    match self.get(&format!("{server}?{query}")).await {
                        Ok(data) => {
                            info!(
                                "Assistance data fetched from {server} ({} bytes, attempt {})",
                                data.len(),
                                failover.attempts()
                            );
                            return Ok(data);
                        }
                        Err(e) => {
                            warn!("Origin {server} failed: {e}");
                            failover.record_failure(e);
                        }
                    }
                }
                FailoverStep::Exhausted(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn servers(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("http://origin{i}.test/data")).collect()
    }

    fn bad_status(url: &str) -> OriginError {
        OriginError::BadStatus {
            url: url.to_string(),
            status: StatusCode::BAD_GATEWAY,
        }
    }

    #[test]
    fn test_failover_visits_servers_in_order() {
        let servers = servers(3);
        let mut failover = Failover::new(&servers);
        for expected in &servers {
            match failover.step() {
                FailoverStep::Try(server) => assert_eq!(server, expected),
                FailoverStep::Exhausted(e) => panic!("exhausted early: {e}"),
            }
            failover.record_failure(bad_status(expected));
        }
        assert_eq!(failover.attempts(), 3);
    }

    #[test]
    fn test_failover_surfaces_last_error_only() {
        let servers = servers(3);
        let mut failover = Failover::new(&servers);
        let err = loop {
            match failover.step() {
                FailoverStep::Try(server) => failover.record_failure(bad_status(server)),
                FailoverStep::Exhausted(err) => break err,
            }
        };
        match err {
            ServiceError::OriginUnavailable {
                attempts,
                source: OriginError::BadStatus { url, .. },
            } => {
                assert_eq!(attempts, 3);
                assert_eq!(url, "http://origin3.test/data");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_failover_with_no_servers() {
        let servers: Vec<String> = Vec::new();
        let mut failover = Failover::new(&servers);
        match failover.step() {
            FailoverStep::Exhausted(ServiceError::OriginUnavailable {
                attempts: 0,
                source: OriginError::NoServers,
            }) => {}
            other => panic!("unexpected step: {other:?}"),
        }
    }
}
