//! Syntactic validation of user-supplied short-video links.

use std::sync::LazyLock;

use regex::Regex;

/// Scheme, optional allow-listed subdomain, fixed host, non-empty path.
static SUPPORTED_URL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^https?://(www\.|vm\.|vt\.)?tiktok\.com/\S+$").ok());

/// Checks whether `input` looks like a supported short-video link.
///
/// Purely syntactic: no network call is made. Surrounding whitespace is
/// ignored, so callers may pass raw user input.
pub fn is_supported_url(input: &str) -> bool {
    let candidate = input.trim();
    if candidate.is_empty() {
        return false;
    }

    SUPPORTED_URL
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(candidate))
}
