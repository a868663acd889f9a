//! Per-service response schemas.
//!
//! Each extraction service answers with its own JSON layout. A `ResponseShape`
//! knows one layout and lifts it into loosely-typed [`MediaFields`]; the
//! normalizer then enforces the invariants every shape shares.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use super::errors::NormalizeError;

/// Fields pulled out of a service payload before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaFields {
    pub video: Option<String>,
    pub audio: Option<String>,
    pub title: Option<String>,
}

/// Decoder for one service's response layout.
pub trait ResponseShape: Send + Sync + fmt::Debug {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Decodes `body` into candidate media fields.
    ///
    /// # Errors
    ///
    /// - `NormalizeError::BadShape` - Body is not JSON of the expected layout,
    ///   or the service reported a failure inside a successful HTTP response
    /// - `NormalizeError::MissingVideo` - Layout is valid but carries no video
    fn extract(&self, body: &[u8]) -> Result<MediaFields, NormalizeError>;
}

fn decode<'a, T: Deserialize<'a>>(shape: &str, body: &'a [u8]) -> Result<T, NormalizeError> {
    serde_json::from_slice(body)
        .map_err(|e| NormalizeError::bad_shape(format!("{shape} payload: {e}")))
}

/// Reads an optional field, treating a value of the wrong type as absent.
///
/// Only the video field decides whether a payload is usable; a service that
/// sends `"title": 123` still produced a downloadable clip.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::debug!("Ignoring mistyped optional field: {}", e);
            None
        }
    }))
}

/// First candidate carrying non-blank text.
fn first_present(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    primary
        .filter(|url| !url.trim().is_empty())
        .or(fallback)
}

/// `{ "video": "...", "music": "...", "title": "..." }`
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatShape;

#[derive(Deserialize)]
struct FlatPayload {
    video: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    music: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    error: Option<String>,
}

impl ResponseShape for FlatShape {
    fn name(&self) -> &'static str {
        "flat"
    }

    fn extract(&self, body: &[u8]) -> Result<MediaFields, NormalizeError> {
        let payload: FlatPayload = decode(self.name(), body)?;

        if let Some(error) = payload.error.filter(|e| !e.trim().is_empty()) {
            return Err(NormalizeError::bad_shape(format!("service error: {error}")));
        }

        Ok(MediaFields {
            video: payload.video,
            audio: payload.music,
            title: payload.title,
        })
    }
}

/// Tiklydown layout: `video` and `music` are either plain URLs or objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct TiklydownShape;

#[derive(Deserialize)]
struct TiklydownPayload {
    video: Option<TiklydownVideo>,
    #[serde(default, deserialize_with = "lenient")]
    music: Option<TiklydownMusic>,
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TiklydownVideo {
    Url(String),
    Detailed {
        #[serde(rename = "noWatermark")]
        no_watermark: Option<String>,
        #[serde(default, deserialize_with = "lenient")]
        watermark: Option<String>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TiklydownMusic {
    Url(String),
    Detailed {
        #[serde(default, deserialize_with = "lenient")]
        play_url: Option<String>,
    },
}

impl ResponseShape for TiklydownShape {
    fn name(&self) -> &'static str {
        "tiklydown"
    }

    fn extract(&self, body: &[u8]) -> Result<MediaFields, NormalizeError> {
        let payload: TiklydownPayload = decode(self.name(), body)?;

        let video = payload.video.and_then(|video| match video {
            TiklydownVideo::Url(url) => Some(url),
            TiklydownVideo::Detailed {
                no_watermark,
                watermark,
            } => first_present(no_watermark, watermark),
        });

        let audio = payload.music.and_then(|music| match music {
            TiklydownMusic::Url(url) => Some(url),
            TiklydownMusic::Detailed { play_url } => play_url,
        });

        Ok(MediaFields {
            video,
            audio,
            title: payload.title,
        })
    }
}

/// TikWM layout: `{ "code": 0, "msg": "...", "data": { "play": ..., "music": ..., "title": ... } }`
#[derive(Debug, Clone, Copy, Default)]
pub struct TikwmShape;

#[derive(Deserialize)]
struct TikwmEnvelope {
    code: i64,
    #[serde(default, deserialize_with = "lenient")]
    msg: Option<String>,
    data: Option<TikwmData>,
}

#[derive(Deserialize)]
struct TikwmData {
    play: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    hdplay: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    music: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
}

impl ResponseShape for TikwmShape {
    fn name(&self) -> &'static str {
        "tikwm"
    }

    fn extract(&self, body: &[u8]) -> Result<MediaFields, NormalizeError> {
        let envelope: TikwmEnvelope = decode(self.name(), body)?;

        if envelope.code != 0 {
            let msg = envelope.msg.unwrap_or_else(|| "unknown error".to_string());
            return Err(NormalizeError::bad_shape(format!(
                "service error {}: {msg}",
                envelope.code
            )));
        }

        let data = envelope.data.ok_or(NormalizeError::MissingVideo)?;

        Ok(MediaFields {
            video: first_present(data.play, data.hdplay),
            audio: data.music,
            title: data.title,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_shape_reads_all_fields() {
        let body = br#"{"video":"https://x/v.mp4","music":"https://x/a.mp3","title":"Clip"}"#;
        let fields = FlatShape.extract(body).unwrap();

        assert_eq!(fields.video.as_deref(), Some("https://x/v.mp4"));
        assert_eq!(fields.audio.as_deref(), Some("https://x/a.mp3"));
        assert_eq!(fields.title.as_deref(), Some("Clip"));
    }

    #[test]
    fn test_flat_shape_service_error() {
        let body = br#"{"error":"Video is private"}"#;
        let result = FlatShape.extract(body);

        assert!(matches!(
            result.unwrap_err(),
            NormalizeError::BadShape { reason } if reason.contains("Video is private")
        ));
    }

    #[test]
    fn test_flat_shape_rejects_non_json() {
        let result = FlatShape.extract(b"<html>Too many requests</html>");
        assert!(matches!(result.unwrap_err(), NormalizeError::BadShape { .. }));
    }

    #[test]
    fn test_flat_shape_rejects_wrong_field_types() {
        let result = FlatShape.extract(br#"{"video":{"url":"https://x/v.mp4"}}"#);
        assert!(matches!(result.unwrap_err(), NormalizeError::BadShape { .. }));
    }

    #[test]
    fn test_flat_shape_ignores_mistyped_optional_fields() {
        let body = br#"{"video":"https://x/v.mp4","music":false,"title":123,"error":null}"#;
        let fields = FlatShape.extract(body).unwrap();

        assert_eq!(fields.video.as_deref(), Some("https://x/v.mp4"));
        assert_eq!(fields.audio, None);
        assert_eq!(fields.title, None);
    }

    #[test]
    fn test_tiklydown_nested_objects() {
        let body = br#"{
            "title": "Dance",
            "video": {"noWatermark": "https://cdn/v.mp4", "watermark": "https://cdn/wm.mp4"},
            "music": {"play_url": "https://cdn/a.mp3"}
        }"#;
        let fields = TiklydownShape.extract(body).unwrap();

        assert_eq!(fields.video.as_deref(), Some("https://cdn/v.mp4"));
        assert_eq!(fields.audio.as_deref(), Some("https://cdn/a.mp3"));
        assert_eq!(fields.title.as_deref(), Some("Dance"));
    }

    #[test]
    fn test_tiklydown_plain_strings_and_watermark_fallback() {
        let fields = TiklydownShape
            .extract(br#"{"video":"https://cdn/v.mp4","music":"https://cdn/a.mp3"}"#)
            .unwrap();
        assert_eq!(fields.video.as_deref(), Some("https://cdn/v.mp4"));

        let fields = TiklydownShape
            .extract(br#"{"video":{"watermark":"https://cdn/wm.mp4"}}"#)
            .unwrap();
        assert_eq!(fields.video.as_deref(), Some("https://cdn/wm.mp4"));
        assert_eq!(fields.audio, None);
    }

    #[test]
    fn test_tiklydown_ignores_mistyped_music_and_title() {
        let body = br#"{
            "title": {"text": "Dance"},
            "video": {"noWatermark": "https://cdn/v.mp4"},
            "music": 42
        }"#;
        let fields = TiklydownShape.extract(body).unwrap();

        assert_eq!(fields.video.as_deref(), Some("https://cdn/v.mp4"));
        assert_eq!(fields.audio, None);
        assert_eq!(fields.title, None);
    }

    #[test]
    fn test_tiklydown_blank_no_watermark_falls_back() {
        let fields = TiklydownShape
            .extract(br#"{"video":{"noWatermark":"","watermark":"https://cdn/wm.mp4"}}"#)
            .unwrap();
        assert_eq!(fields.video.as_deref(), Some("https://cdn/wm.mp4"));
    }

    #[test]
    fn test_tikwm_envelope() {
        let body = br#"{
            "code": 0,
            "msg": "success",
            "data": {"play": "https://t/v.mp4", "music": "https://t/a.mp3", "title": "Hi"}
        }"#;
        let fields = TikwmShape.extract(body).unwrap();

        assert_eq!(fields.video.as_deref(), Some("https://t/v.mp4"));
        assert_eq!(fields.audio.as_deref(), Some("https://t/a.mp3"));
        assert_eq!(fields.title.as_deref(), Some("Hi"));
    }

    #[test]
    fn test_tikwm_error_code() {
        let body = br#"{"code":-1,"msg":"Url parsing is failed! Please check url."}"#;
        let result = TikwmShape.extract(body);

        assert!(matches!(
            result.unwrap_err(),
            NormalizeError::BadShape { reason } if reason.contains("Url parsing is failed")
        ));
    }

    #[test]
    fn test_tikwm_ignores_mistyped_music_and_title() {
        let body = br#"{
            "code": 0,
            "msg": "success",
            "data": {"play": "https://t/v.mp4", "music": {"id": 7}, "title": 99}
        }"#;
        let fields = TikwmShape.extract(body).unwrap();

        assert_eq!(fields.video.as_deref(), Some("https://t/v.mp4"));
        assert_eq!(fields.audio, None);
        assert_eq!(fields.title, None);
    }

    #[test]
    fn test_tikwm_blank_play_falls_back_to_hdplay() {
        let body = br#"{"code":0,"data":{"play":"  ","hdplay":"https://t/hd.mp4"}}"#;
        let fields = TikwmShape.extract(body).unwrap();
        assert_eq!(fields.video.as_deref(), Some("https://t/hd.mp4"));
    }

    #[test]
    fn test_tikwm_missing_data() {
        let result = TikwmShape.extract(br#"{"code":0,"msg":"success"}"#);
        assert_eq!(result.unwrap_err(), NormalizeError::MissingVideo);
    }
}
