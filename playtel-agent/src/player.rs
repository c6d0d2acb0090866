//! Host player capability interface
//!
//! The agent never talks to a concrete player type. Payload-time metadata
//! (source descriptor, decoder statistics, supported key systems) comes
//! through this trait; per-signal state travels inside
//! [`playtel_common::SignalFrame`]s built by the adapter at emission time.
//! Tests substitute a fake probe.

use playtel_common::SourceDescriptor;
use serde::Serialize;

/// Video resolution in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// Decoder statistics, when the host exposes them
///
/// Absent values stay absent; they serialize as JSON null.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PlaybackStats {
    pub bitrate: Option<u64>,
    pub resolution: Option<Resolution>,
}

/// Read-only queries against the host player
pub trait PlayerProbe: Send {
    /// Descriptor of the active source, if any
    fn current_source(&self) -> Option<SourceDescriptor>;

    /// Decoder statistics for the active playback, when available
    fn stats(&self) -> PlaybackStats;

    /// Key systems the host environment supports
    fn supported_drm(&self) -> Vec<String>;
}
