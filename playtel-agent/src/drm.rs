//! DRM and format type lookup
//!
//! Pure lookup against host-exposed metadata: no probing, no negotiation.
//! Format comes from the source MIME type; DRM type is derived only for
//! protected sources, preferring a key system the host actually supports.

use playtel_common::SourceDescriptor;
use serde::Serialize;

pub const HLS: &str = "application/x-mpegurl";
pub const DASH: &str = "application/dash+xml";
pub const SMOOTH_STREAMING: &str = "application/vnd.ms-sstr+xml";

pub const FAIRPLAY: &str = "com.apple.fps.1_0";
pub const WIDEVINE: &str = "com.widevine.alpha";
pub const PLAYREADY: &str = "com.microsoft.playready";

/// Detected format and DRM type for the active source
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaTypes {
    pub format_type: Option<String>,
    pub drm_type: Option<String>,
}

/// Derive format and DRM type from the source descriptor and the key
/// systems the host supports
pub fn detect(source: Option<&SourceDescriptor>, supported_drm: &[String]) -> MediaTypes {
    let Some(source) = source else {
        return MediaTypes::default();
    };

    let format_type = Some(source.mime_type.clone());
    let mut drm_type = None;

    if source.protected {
        drm_type = match source.mime_type.as_str() {
            DASH => dash_drm(source, supported_drm),
            HLS if supported_drm.iter().any(|ks| ks == FAIRPLAY) => Some(FAIRPLAY.to_string()),
            SMOOTH_STREAMING => Some(PLAYREADY.to_string()),
            _ => None,
        };
    }

    MediaTypes { format_type, drm_type }
}

/// DASH sources declare candidate key systems; prefer the first one the
/// host supports, falling back to the first declared
fn dash_drm(source: &SourceDescriptor, supported_drm: &[String]) -> Option<String> {
    if source.key_systems.is_empty() {
        return None;
    }

    source
        .key_systems
        .iter()
        .find(|ks| supported_drm.contains(ks))
        .or_else(|| source.key_systems.first())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn protected_source(mime: &str, key_systems: &[&str]) -> SourceDescriptor {
        SourceDescriptor {
            mime_type: mime.to_string(),
            url: None,
            network: None,
            is_broadcast: false,
            protected: true,
            key_systems: key_systems.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn unprotected_source_has_no_drm() {
        let source = SourceDescriptor::unprotected(HLS);
        let types = detect(Some(&source), &[FAIRPLAY.to_string()]);
        assert_eq!(types.format_type.as_deref(), Some(HLS));
        assert_eq!(types.drm_type, None);
    }

    #[test]
    fn smooth_streaming_maps_to_playready() {
        let source = protected_source(SMOOTH_STREAMING, &[]);
        let types = detect(Some(&source), &[]);
        assert_eq!(types.drm_type.as_deref(), Some(PLAYREADY));
    }

    #[test]
    fn hls_uses_fairplay_when_supported() {
        let source = protected_source(HLS, &[]);
        let types = detect(Some(&source), &[FAIRPLAY.to_string()]);
        assert_eq!(types.drm_type.as_deref(), Some(FAIRPLAY));

        let types = detect(Some(&source), &[WIDEVINE.to_string()]);
        assert_eq!(types.drm_type, None);
    }

    #[test]
    fn dash_prefers_supported_key_system() {
        let source = protected_source(DASH, &[PLAYREADY, WIDEVINE]);
        let types = detect(Some(&source), &[WIDEVINE.to_string()]);
        assert_eq!(types.drm_type.as_deref(), Some(WIDEVINE));
    }

    #[test]
    fn dash_falls_back_to_first_declared_key_system() {
        let source = protected_source(DASH, &[PLAYREADY, WIDEVINE]);
        let types = detect(Some(&source), &[]);
        assert_eq!(types.drm_type.as_deref(), Some(PLAYREADY));
    }

    #[test]
    fn no_source_yields_empty_types() {
        assert_eq!(detect(None, &[]), MediaTypes::default());
    }
}
