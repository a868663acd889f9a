//! Endpoint descriptors and the fixed-priority registry.
//!
//! Registry order is the fallback order. The registry is immutable once
//! built and is shared read-only between concurrent resolutions.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use url::Url;

use super::shapes::{FlatShape, ResponseShape, TiklydownShape, TikwmShape};
use super::types::RequestSpec;
use crate::ClipfetchError;

/// One third-party extraction service.
#[derive(Clone)]
pub struct EndpointDescriptor {
    id: String,
    base_url: String,
    headers: BTreeMap<String, String>,
    shape: Arc<dyn ResponseShape>,
}

impl EndpointDescriptor {
    /// Creates a descriptor for a service at `base_url` answering in `shape`.
    pub fn new(
        id: impl Into<String>,
        base_url: impl Into<String>,
        shape: impl ResponseShape + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            base_url: base_url.into(),
            headers: BTreeMap::new(),
            shape: Arc::new(shape),
        }
    }

    /// Adds a header sent with every request to this service.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn shape(&self) -> &dyn ResponseShape {
        self.shape.as_ref()
    }

    /// Builds the request for resolving `target_url` through this service.
    ///
    /// The link travels percent-encoded in the `url` query parameter.
    pub fn build_request(&self, target_url: &str) -> RequestSpec {
        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        RequestSpec {
            url: format!(
                "{}{}url={}",
                self.base_url,
                separator,
                urlencoding::encode(target_url)
            ),
            headers: self.headers.clone(),
        }
    }
}

impl fmt::Debug for EndpointDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointDescriptor")
            .field("id", &self.id)
            .field("base_url", &self.base_url)
            .field("headers", &self.headers)
            .field("shape", &self.shape.name())
            .finish()
    }
}

/// Ordered, immutable list of endpoints.
#[derive(Debug, Clone)]
pub struct EndpointRegistry {
    entries: Arc<[EndpointDescriptor]>,
}

impl EndpointRegistry {
    /// Creates a registry from endpoints in fallback priority order.
    ///
    /// # Errors
    ///
    /// - `ClipfetchError::Configuration` - No endpoints, a blank or duplicate
    ///   id, or a base URL that is not absolute http(s)
    pub fn new(entries: Vec<EndpointDescriptor>) -> Result<Self, ClipfetchError> {
        if entries.is_empty() {
            return Err(ClipfetchError::Configuration {
                reason: "endpoint registry is empty".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.id.trim().is_empty() {
                return Err(ClipfetchError::Configuration {
                    reason: format!("endpoint at {} has a blank id", entry.base_url),
                });
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(ClipfetchError::Configuration {
                    reason: format!("duplicate endpoint id '{}'", entry.id),
                });
            }
            let parsed = Url::parse(&entry.base_url).map_err(|e| ClipfetchError::Configuration {
                reason: format!("endpoint '{}' has invalid base URL: {e}", entry.id),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ClipfetchError::Configuration {
                    reason: format!("endpoint '{}' must use http or https", entry.id),
                });
            }
        }

        Ok(Self {
            entries: entries.into(),
        })
    }

    /// The services the application ships with, in priority order.
    pub fn builtin() -> Self {
        let entries = vec![
            EndpointDescriptor::new(
                "tiklydown",
                "https://api.tiklydown.eu.org/api/download",
                TiklydownShape,
            )
            .with_header("X-Requested-With", "XMLHttpRequest"),
            EndpointDescriptor::new(
                "tiktokdownloader",
                "https://api.tiktokdownloader.xyz/api/download",
                FlatShape,
            )
            .with_header("X-Requested-With", "XMLHttpRequest"),
            EndpointDescriptor::new("tikwm", "https://www.tikwm.com/api/", TikwmShape)
                .with_header("X-Requested-With", "XMLHttpRequest"),
        ];

        Self {
            entries: entries.into(),
        }
    }

    /// Endpoints in fallback order.
    pub fn entries(&self) -> &[EndpointDescriptor] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up an endpoint by id.
    pub fn get(&self, id: &str) -> Option<&EndpointDescriptor> {
        self.entries.iter().find(|entry| entry.id == id)
    }
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
