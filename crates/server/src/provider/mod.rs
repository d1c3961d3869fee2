//! Mapping providers the planner leans on: a geocoder to turn free text
//! into coordinates (and back), and a router for the base driving route.
//!
//! Everything behind these traits is remote and slow, so callers go
//! through [`CallPolicy`], which bounds every call and retries transient
//! upstream failures once.

mod nominatim;
mod osrm;
mod polyline;
mod straight_line;

pub use nominatim::NominatimGeocoder;
pub use osrm::{OsrmConfig, OsrmRouter};
pub use polyline::decode_polyline;
pub use straight_line::StraightLineRouter;

use async_trait::async_trait;
use haulplan::prelude::*;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Could not find a location for \"{0}\"")]
    NotFound(String),
    #[error("{service} request failed: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },
    #[error("{0} did not answer in time")]
    Timeout(&'static str),
    #[error("{service} sent an unreadable response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
}

impl Error {
    pub(crate) fn from_reqwest(service: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout(service)
        } else if err.is_decode() {
            Error::Decode {
                service,
                message: err.to_string(),
            }
        } else {
            Error::Upstream {
                service,
                message: err.to_string(),
            }
        }
    }
}

/// A geocoded place.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub coordinate: Coordinate,
    /// Display name as the geocoder spells it.
    pub label: String,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Place, self::Error>;

    /// Best-effort address for a coordinate, `None` when there is nothing nearby.
    async fn reverse(&self, coordinate: Coordinate) -> Result<Option<String>, self::Error>;

    fn name(&self) -> &'static str;
}

#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn route(&self, from: Coordinate, to: Coordinate) -> Result<RouteLeg, self::Error>;

    fn name(&self) -> &'static str;
}

/// Deadline and retry rules for one outbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPolicy {
    pub timeout: std::time::Duration,
    pub backoff: std::time::Duration,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout: std::time::Duration::from_secs(10),
            backoff: std::time::Duration::from_millis(250),
        }
    }
}

impl CallPolicy {
    /// Runs `call` under the deadline. An upstream failure gets one more
    /// attempt after the backoff, a timeout does not.
    pub async fn run<T, F, Fut>(&self, service: &'static str, mut call: F) -> Result<T, self::Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, self::Error>>,
    {
        match self.attempt(service, call()).await {
            Err(err @ Error::Upstream { .. }) => {
                warn!("{err}, retrying in {:?}", self.backoff);
                tokio::time::sleep(self.backoff).await;
                self.attempt(service, call()).await
            }
            result => result,
        }
    }

    async fn attempt<T>(
        &self,
        service: &'static str,
        call: impl Future<Output = Result<T, self::Error>>,
    ) -> Result<T, self::Error> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| Error::Timeout(service))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy() -> CallPolicy {
        CallPolicy {
            timeout: std::time::Duration::from_millis(50),
            backoff: std::time::Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn upstream_failure_is_retried_once() {
        let calls = &AtomicU32::new(0);
        let result = policy()
            .run("test", || async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(Error::Upstream {
                        service: "test",
                        message: "503".into(),
                    })
                } else {
                    Ok(7)
                }
            })
            .await;
        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn second_upstream_failure_is_final() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = policy()
            .run("test", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::Upstream {
                    service: "test",
                    message: "503".into(),
                })
            })
            .await;
        assert!(matches!(result, Err(Error::Upstream { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn timeout_is_not_retried() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = policy()
            .run("slow", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        assert_eq!(result, Err(Error::Timeout("slow")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn not_found_is_not_retried() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = policy()
            .run("test", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::NotFound("nowhere".into()))
            })
            .await;
        assert_eq!(result, Err(Error::NotFound("nowhere".into())));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
