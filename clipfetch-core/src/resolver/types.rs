//! Value types exchanged between resolver components

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Title shown when a service does not report one.
pub const DEFAULT_TITLE: &str = "TikTok Video";
/// Suggested file name for the video download.
pub const VIDEO_FILE_NAME: &str = "tiktok-video.mp4";
/// Suggested file name for the audio download.
pub const AUDIO_FILE_NAME: &str = "tiktok-music.mp3";

/// One outbound HTTP request, fully described.
///
/// Built by an endpoint descriptor from the user's link; the transport
/// sends it verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    /// Absolute request URL including the encoded `url` query parameter
    pub url: String,
    /// Extra headers required by the target service
    pub headers: BTreeMap<String, String>,
}

impl RequestSpec {
    /// Creates a request with no extra headers.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
        }
    }
}

/// Undecoded response from an extraction service.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body bytes
    pub body: Bytes,
}

impl RawResponse {
    /// Creates a response from a status code and body.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Endpoint-agnostic description of a resolved clip.
///
/// `video_url` is always an absolute http(s) URL; the normalizer rejects
/// anything else before a `MediaResult` reaches the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaResult {
    pub video_url: String,
    pub audio_url: Option<String>,
    pub title: Option<String>,
}

impl MediaResult {
    /// Title to present, falling back to a generic label.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|title| !title.trim().is_empty())
            .unwrap_or(DEFAULT_TITLE)
    }
}
