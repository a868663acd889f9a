//! Clipfetch Core - Multi-endpoint media resolution for short-video links
//!
//! This crate resolves a user-supplied short-video URL into downloadable media
//! URLs by querying third-party extraction services in a fixed priority order,
//! falling back to the next service whenever one times out, errors, or returns
//! a payload that cannot be normalized.

pub mod config;
pub mod resolver;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::{ClipfetchConfig, NetworkConfig};
pub use resolver::{
    AttemptOutcome, EndpointDescriptor, EndpointRegistry, FetchError, HttpTransport, MediaResult,
    NormalizeError, RejectReason, ResolutionAttempt, ResolveHandle, ResolveOutcome, Resolver,
    Transport,
};

/// Construction-time errors for Clipfetch components.
///
/// Per-attempt network and payload failures never surface here; they are
/// classified into [`ResolveOutcome`] by the resolver. These variants cover
/// configuration mistakes that prevent a resolver from being built at all.
#[derive(Debug, thiserror::Error)]
pub enum ClipfetchError {
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("HTTP client error: {reason}")]
    HttpClient { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClipfetchError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            ClipfetchError::Configuration { reason } => format!("Invalid configuration: {reason}"),
            ClipfetchError::HttpClient { .. } => "Could not initialise the HTTP client".to_string(),
            ClipfetchError::Io(_) => "File system error occurred".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClipfetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_client_details() {
        let error = ClipfetchError::HttpClient {
            reason: "tls backend unavailable".to_string(),
        };
        assert_eq!(error.user_message(), "Could not initialise the HTTP client");

        let error = ClipfetchError::Configuration {
            reason: "registry has no endpoints".to_string(),
        };
        assert!(error.user_message().contains("registry has no endpoints"));
    }
}
