//! Response normalization into `MediaResult`.

use url::Url;

use super::errors::NormalizeError;
use super::registry::EndpointDescriptor;
use super::shapes::MediaFields;
use super::types::{MediaResult, RawResponse};

/// Maps a raw service response into a canonical `MediaResult`.
///
/// Decoding is delegated to the endpoint's response shape; this function
/// enforces the shared invariants: a non-empty, absolute http(s) video URL.
/// Audio and title are optional and blank values are treated as absent.
///
/// # Errors
///
/// - `NormalizeError::BadShape` - Payload not decodable for this endpoint
/// - `NormalizeError::MissingVideo` - No video URL, or an empty one
/// - `NormalizeError::InvalidVideoUrl` - Video URL is not absolute http(s)
pub fn normalize(
    endpoint: &EndpointDescriptor,
    raw: &RawResponse,
) -> Result<MediaResult, NormalizeError> {
    let fields = endpoint.shape().extract(&raw.body)?;
    validate_fields(fields)
}

pub(crate) fn validate_fields(fields: MediaFields) -> Result<MediaResult, NormalizeError> {
    let video_url = non_blank(fields.video).ok_or(NormalizeError::MissingVideo)?;
    if !is_absolute_http_url(&video_url) {
        return Err(NormalizeError::InvalidVideoUrl { url: video_url });
    }

    let audio_url = non_blank(fields.audio).filter(|audio| {
        let valid = is_absolute_http_url(audio);
        if !valid {
            tracing::debug!("Dropping unusable audio URL: {}", audio);
        }
        valid
    });

    Ok(MediaResult {
        video_url,
        audio_url,
        title: non_blank(fields.title),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_absolute_http_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
        Err(_) => false,
    }
}
