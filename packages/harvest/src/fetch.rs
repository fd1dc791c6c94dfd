//! Page fetching behind the [`Fetch`] trait.
//!
//! [`HttpFetcher`] is the production implementation: a shared
//! [`reqwest::Client`] with a bounded per-request timeout. It performs no
//! retries of its own — retry policy belongs to the scheduler so backoff
//! and budget are governed in one place.

use std::time::Duration;

use meteo_harvest_models::FailureKind;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors from a single page fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-success status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// Connection-level failure (DNS, refused, reset, TLS).
    #[error("network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if let Some(status) = e.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Network(e.to_string())
        }
    }
}

impl From<&FetchError> for FailureKind {
    fn from(e: &FetchError) -> Self {
        match e {
            FetchError::Timeout => Self::Timeout,
            FetchError::Status(status) => Self::Http(*status),
            FetchError::Network(_) => Self::Network,
        }
    }
}

/// Trait for fetching the body of a page.
///
/// The scheduler and topology resolver are generic over this seam so
/// tests can substitute stub implementations with no network.
pub trait Fetch: Send + Sync {
    /// Fetches `url` and returns the response body text.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on timeout, non-success status, or
    /// connection failure.
    fn fetch(&self, url: &str) -> impl std::future::Future<Output = Result<String, FetchError>> + Send;
}

/// HTTP implementation of [`Fetch`] backed by a shared connection pool.
///
/// Cloning is cheap; the underlying `reqwest::Client` is reference
/// counted and safe to share across concurrent fetches.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Builds a fetcher whose requests abort after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Network`] if the TLS backend cannot be
    /// initialized.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}
