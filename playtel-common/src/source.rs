//! Media source descriptors

use serde::{Deserialize, Serialize};

/// Immutable snapshot of the active media source
///
/// Replaced wholesale on source change, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// MIME type, e.g. `application/x-mpegurl`
    pub mime_type: String,
    /// Playback URL as reported by the host
    pub url: Option<String>,
    /// Distribution network tag, when the host tags sources
    pub network: Option<String>,
    /// Live broadcast sources have no meaningful progress percentage
    pub is_broadcast: bool,
    /// True when the source is DRM protected
    pub protected: bool,
    /// Key systems the source declares, preference order
    pub key_systems: Vec<String>,
}

impl SourceDescriptor {
    /// Unprotected on-demand source with the given MIME type
    pub fn unprotected(mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            url: None,
            network: None,
            is_broadcast: false,
            protected: false,
            key_systems: Vec::new(),
        }
    }
}
