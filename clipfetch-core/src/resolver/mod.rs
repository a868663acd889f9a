//! Multi-endpoint media resolution.
//!
//! A resolution moves through validation, then one attempt per registry
//! entry in priority order. Each attempt is a bounded-time fetch followed by
//! per-service normalization; any failure advances to the next entry. The
//! call ends as `Succeeded`, `Exhausted`, `Rejected` (input never sent) or
//! `Cancelled` (caller gave up).

pub mod errors;
pub mod fetch;
pub mod normalize;
pub mod orchestrator;
pub mod registry;
pub mod shapes;
pub mod types;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

// Re-export public API
pub use errors::{FetchError, NormalizeError};
pub use fetch::{HttpTransport, Transport, fetch_bounded};
pub use normalize::normalize;
pub use orchestrator::{
    AttemptOutcome, RejectReason, ResolutionAttempt, ResolveHandle, ResolveOutcome, Resolver,
};
pub use registry::{EndpointDescriptor, EndpointRegistry};
pub use shapes::{FlatShape, MediaFields, ResponseShape, TiklydownShape, TikwmShape};
pub use types::{
    AUDIO_FILE_NAME, DEFAULT_TITLE, MediaResult, RawResponse, RequestSpec, VIDEO_FILE_NAME,
};
pub use validation::is_supported_url;
