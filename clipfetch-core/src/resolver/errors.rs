//! Per-attempt error types.
//!
//! Every variant here is recoverable: the resolver records it against the
//! endpoint that produced it and moves on to the next endpoint.

use thiserror::Error;

/// Failure to obtain a successful HTTP response within the deadline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Deadline elapsed before the service answered
    #[error("Request timed out")]
    Timeout,

    /// Service answered with a non-2xx status
    #[error("Service returned HTTP {status}")]
    HttpStatus { status: u16 },

    /// Transport-level failure (DNS, connect, reset, body read)
    #[error("Network error: {reason}")]
    Network { reason: String },
}

/// Failure to turn a service payload into a `MediaResult`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// Payload parsed but carries no playable video URL
    #[error("No video URL found in response")]
    MissingVideo,

    /// Payload is not in the shape this endpoint is expected to return
    #[error("Malformed response: {reason}")]
    BadShape { reason: String },

    /// Video field is present but is not an absolute http(s) URL
    #[error("Video URL is not a valid absolute URL: {url}")]
    InvalidVideoUrl { url: String },
}

impl NormalizeError {
    pub(crate) fn bad_shape(reason: impl Into<String>) -> Self {
        NormalizeError::BadShape {
            reason: reason.into(),
        }
    }
}
