//! Centralized configuration for Clipfetch.
//!
//! All tunable parameters are defined here to avoid hard-coded values
//! scattered throughout the resolver.

use std::time::Duration;

/// Central configuration for all Clipfetch components.
///
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct ClipfetchConfig {
    pub network: NetworkConfig,
}

/// HTTP communication settings for extraction service requests.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Per-attempt deadline; an endpoint that has not answered by then is abandoned
    pub request_timeout: Duration,
    /// User agent for HTTP requests
    pub user_agent: &'static str,
    /// Maximum redirects followed per request
    pub max_redirects: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_millis(10_000),
            user_agent: "clipfetch/0.1.0",
            max_redirects: 3,
        }
    }
}

impl NetworkConfig {
    /// Returns a copy with the per-attempt timeout replaced.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl ClipfetchConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Recognises `CLIPFETCH_REQUEST_TIMEOUT_MS` and `CLIPFETCH_MAX_REDIRECTS`.
    /// Values that fail to parse are ignored and the default is kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(timeout) = std::env::var("CLIPFETCH_REQUEST_TIMEOUT_MS") {
            if let Ok(millis) = timeout.trim().parse::<u64>() {
                config.network.request_timeout = Duration::from_millis(millis);
            }
        }

        if let Ok(redirects) = std::env::var("CLIPFETCH_MAX_REDIRECTS") {
            if let Ok(count) = redirects.trim().parse::<usize>() {
                config.network.max_redirects = count;
            }
        }

        config
    }

    /// Creates a configuration with short deadlines for tests.
    pub fn for_testing() -> Self {
        Self {
            network: NetworkConfig {
                request_timeout: Duration::from_millis(250),
                user_agent: "clipfetch/test",
                max_redirects: 0,
            },
        }
    }
}
