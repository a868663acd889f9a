//! Resolution orchestrator.
//!
//! Drives one resolution from raw user input to a terminal outcome:
//! validate, then walk the registry in order, fetching and normalizing
//! against each endpoint until one yields a usable result. Every call owns
//! its own cursor and attempt history; the resolver itself holds only
//! read-only state and may be shared freely between tasks.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::errors::{FetchError, NormalizeError};
use super::fetch::{HttpTransport, Transport, fetch_bounded};
use super::normalize::normalize;
use super::registry::{EndpointDescriptor, EndpointRegistry};
use super::types::MediaResult;
use super::validation::is_supported_url;
use crate::ClipfetchError;
use crate::config::ClipfetchConfig;

/// Classified result of one fetch+normalize cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success(MediaResult),
    Timeout,
    HttpStatus(u16),
    MalformedResponse(NormalizeError),
    NetworkError(String),
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success(_))
    }
}

impl From<FetchError> for AttemptOutcome {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::Timeout => AttemptOutcome::Timeout,
            FetchError::HttpStatus { status } => AttemptOutcome::HttpStatus(status),
            FetchError::Network { reason } => AttemptOutcome::NetworkError(reason),
        }
    }
}

impl From<NormalizeError> for AttemptOutcome {
    fn from(error: NormalizeError) -> Self {
        AttemptOutcome::MalformedResponse(error)
    }
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptOutcome::Success(_) => write!(f, "success"),
            AttemptOutcome::Timeout => write!(f, "timed out"),
            AttemptOutcome::HttpStatus(status) => write!(f, "HTTP {status}"),
            AttemptOutcome::MalformedResponse(error) => write!(f, "{error}"),
            AttemptOutcome::NetworkError(reason) => write!(f, "network error: {reason}"),
        }
    }
}

/// Diagnostic record of one attempt against one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionAttempt {
    pub endpoint_id: String,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub outcome: AttemptOutcome,
}

/// Why input was refused before any network traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    InvalidUrl { input: String },
}

/// Terminal state of a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// Input failed validation; no endpoint was contacted
    Rejected(RejectReason),
    /// An endpoint produced a usable result; `attempts` ends with its success
    Succeeded {
        result: MediaResult,
        attempts: Vec<ResolutionAttempt>,
    },
    /// Every endpoint failed, one attempt each, in registry order
    Exhausted { attempts: Vec<ResolutionAttempt> },
    /// Caller cancelled; holds the attempts that completed beforehand
    Cancelled { attempts: Vec<ResolutionAttempt> },
}

impl ResolveOutcome {
    /// Attempt history in the order attempts were made.
    pub fn attempts(&self) -> &[ResolutionAttempt] {
        match self {
            ResolveOutcome::Rejected(_) => &[],
            ResolveOutcome::Succeeded { attempts, .. }
            | ResolveOutcome::Exhausted { attempts }
            | ResolveOutcome::Cancelled { attempts } => attempts,
        }
    }

    /// Resolved media, if the resolution succeeded.
    pub fn media(&self) -> Option<&MediaResult> {
        match self {
            ResolveOutcome::Succeeded { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResolveOutcome::Succeeded { .. })
    }

    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            ResolveOutcome::Rejected(RejectReason::InvalidUrl { input }) => {
                if input.trim().is_empty() {
                    "Please enter a TikTok URL".to_string()
                } else {
                    "Invalid TikTok URL. Please check and try again.".to_string()
                }
            }
            ResolveOutcome::Succeeded { result, .. } => {
                format!("Ready to download: {}", result.display_title())
            }
            ResolveOutcome::Exhausted { .. } => {
                "Failed to download video. Possible reasons:\n\
                 1. Video is private\n\
                 2. URL is invalid\n\
                 3. Server is busy"
                    .to_string()
            }
            ResolveOutcome::Cancelled { .. } => "Download cancelled".to_string(),
        }
    }
}

/// Per-call cursor. Created at the start of a resolution, dropped at its end.
struct ResolutionState {
    target_url: String,
    endpoint_cursor: usize,
    attempts: Vec<ResolutionAttempt>,
}

impl ResolutionState {
    fn new(target_url: &str, capacity: usize) -> Self {
        Self {
            target_url: target_url.to_string(),
            endpoint_cursor: 0,
            attempts: Vec::with_capacity(capacity),
        }
    }
}

/// Resolves short-video links against a registry of extraction services.
///
/// Cloning is cheap; clones share the registry and transport.
#[derive(Clone)]
pub struct Resolver {
    registry: EndpointRegistry,
    transport: Arc<dyn Transport>,
    request_timeout: Duration,
}

impl Resolver {
    /// Creates a resolver for the built-in services over HTTP.
    ///
    /// # Errors
    ///
    /// - `ClipfetchError::HttpClient` - HTTP client construction failed
    pub fn new(config: &ClipfetchConfig) -> Result<Self, ClipfetchError> {
        let transport = HttpTransport::new(&config.network)?;
        Ok(Self::with_transport(
            EndpointRegistry::builtin(),
            Arc::new(transport),
            config.network.request_timeout,
        ))
    }

    /// Creates a resolver from explicit parts.
    pub fn with_transport(
        registry: EndpointRegistry,
        transport: Arc<dyn Transport>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            transport,
            request_timeout,
        }
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Resolves `url` to completion.
    pub async fn resolve(&self, url: &str) -> ResolveOutcome {
        self.resolve_with_cancel(url, &CancellationToken::new()).await
    }

    /// Resolves `url`, settling to `Cancelled` as soon as `cancel` fires.
    ///
    /// An attempt in flight at cancellation time is dropped and does not
    /// appear in the history.
    pub async fn resolve_with_cancel(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> ResolveOutcome {
        let target = url.trim();
        let span = tracing::info_span!("resolve", url = %target);
        self.run(target, cancel).instrument(span).await
    }

    /// Starts resolving `url` on a background task.
    pub fn spawn(&self, url: impl Into<String>) -> ResolveHandle {
        let cancel = CancellationToken::new();
        let resolver = self.clone();
        let url = url.into();
        let token = cancel.clone();

        let task = tokio::spawn(async move { resolver.resolve_with_cancel(&url, &token).await });

        ResolveHandle { cancel, task }
    }

    async fn run(&self, target: &str, cancel: &CancellationToken) -> ResolveOutcome {
        if !is_supported_url(target) {
            tracing::info!("Rejected unsupported URL");
            return ResolveOutcome::Rejected(RejectReason::InvalidUrl {
                input: target.to_string(),
            });
        }

        let mut state = ResolutionState::new(target, self.registry.len());
        let mut cancelled = false;

        while let Some(endpoint) = self.registry.entries().get(state.endpoint_cursor) {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            tracing::debug!(
                "Trying endpoint {} ({}/{})",
                endpoint.id(),
                state.endpoint_cursor + 1,
                self.registry.len()
            );

            let started_at = Utc::now();
            let clock = Instant::now();

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                outcome = self.attempt(endpoint, &state.target_url) => outcome,
            };

            let elapsed = clock.elapsed();
            state.attempts.push(ResolutionAttempt {
                endpoint_id: endpoint.id().to_string(),
                started_at,
                elapsed,
                outcome: outcome.clone(),
            });

            if let AttemptOutcome::Success(result) = outcome {
                tracing::info!(
                    "Endpoint {} resolved media in {:?} after {} attempt(s)",
                    endpoint.id(),
                    elapsed,
                    state.attempts.len()
                );
                return ResolveOutcome::Succeeded {
                    result,
                    attempts: state.attempts,
                };
            }

            tracing::warn!("Endpoint {} failed: {}", endpoint.id(), outcome);
            state.endpoint_cursor += 1;
        }

        // A token fired after the last attempt settled does not undo exhaustion
        if cancelled {
            tracing::info!(
                "Resolution cancelled after {} attempt(s)",
                state.attempts.len()
            );
            return ResolveOutcome::Cancelled {
                attempts: state.attempts,
            };
        }

        tracing::info!("All {} endpoints failed", state.attempts.len());
        ResolveOutcome::Exhausted {
            attempts: state.attempts,
        }
    }

    async fn attempt(&self, endpoint: &EndpointDescriptor, target: &str) -> AttemptOutcome {
        let request = endpoint.build_request(target);

        let raw = match fetch_bounded(self.transport.as_ref(), &request, self.request_timeout).await
        {
            Ok(raw) => raw,
            Err(e) => return e.into(),
        };

        match normalize(endpoint, &raw) {
            Ok(result) => AttemptOutcome::Success(result),
            Err(e) => e.into(),
        }
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("registry", &self.registry)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

/// Handle to a resolution running on a background task.
#[derive(Debug)]
pub struct ResolveHandle {
    cancel: CancellationToken,
    task: JoinHandle<ResolveOutcome>,
}

impl ResolveHandle {
    /// Requests cancellation. The resolution settles to `Cancelled` unless
    /// it already reached another terminal outcome.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this resolution when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Waits for the terminal outcome.
    ///
    /// # Panics
    ///
    /// Re-raises a panic that occurred inside the resolution task.
    pub async fn outcome(self) -> ResolveOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => ResolveOutcome::Cancelled {
                attempts: Vec::new(),
            },
        }
    }
}
