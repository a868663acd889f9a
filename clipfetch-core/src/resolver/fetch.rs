//! Bounded-time HTTP fetching.
//!
//! `Transport` abstracts the wire so the resolver can be driven by a scripted
//! fake in tests; `fetch_bounded` races one transport call against a deadline
//! and classifies the result.

use std::time::Duration;

use async_trait::async_trait;

use super::errors::FetchError;
use super::types::{RawResponse, RequestSpec};
use crate::ClipfetchError;
use crate::config::NetworkConfig;

/// Sends a single request and returns whatever the server answered.
///
/// Implementations must not retry and must not interpret the status code;
/// classification is done by [`fetch_bounded`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `spec` and returns the raw response.
    ///
    /// # Errors
    ///
    /// - `FetchError::Network` - DNS, connection or body read failure
    /// - `FetchError::Timeout` - Transport-level deadline exceeded
    async fn send(&self, spec: &RequestSpec) -> Result<RawResponse, FetchError>;
}

/// reqwest-backed transport used in production.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates an HTTP transport from network configuration.
    ///
    /// The client carries no request timeout of its own; the deadline is
    /// applied per attempt by [`fetch_bounded`].
    ///
    /// # Errors
    ///
    /// - `ClipfetchError::HttpClient` - TLS backend or client builder failure
    pub fn new(config: &NetworkConfig) -> Result<Self, ClipfetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| ClipfetchError::HttpClient {
                reason: e.to_string(),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, spec: &RequestSpec) -> Result<RawResponse, FetchError> {
        let mut request = self.client.get(&spec.url);
        for (name, value) in &spec.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            tracing::debug!("HTTP request to {} failed: {}", spec.url, e);
            classify_reqwest_error(&e)
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| {
            tracing::debug!("Failed to read response body from {}: {}", spec.url, e);
            classify_reqwest_error(&e)
        })?;

        Ok(RawResponse { status, body })
    }
}

fn classify_reqwest_error(error: &reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network {
            reason: error.to_string(),
        }
    }
}

/// Issues exactly one request, bounded by `timeout`.
///
/// Whichever settles first wins. When the deadline fires the in-flight
/// transport future is dropped, so its eventual result is never observed.
///
/// # Errors
///
/// - `FetchError::Timeout` - Deadline elapsed first
/// - `FetchError::HttpStatus` - Response status outside 2xx
/// - `FetchError::Network` - Transport failure reported before the deadline
pub async fn fetch_bounded<T>(
    transport: &T,
    spec: &RequestSpec,
    timeout: Duration,
) -> Result<RawResponse, FetchError>
where
    T: Transport + ?Sized,
{
    let response = match tokio::time::timeout(timeout, transport.send(spec)).await {
        Ok(result) => result?,
        Err(_) => {
            tracing::debug!("Request to {} exceeded {:?}", spec.url, timeout);
            return Err(FetchError::Timeout);
        }
    };

    if !response.is_success() {
        return Err(FetchError::HttpStatus {
            status: response.status,
        });
    }

    Ok(response)
}
