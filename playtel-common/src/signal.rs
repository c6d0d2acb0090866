//! Player lifecycle signals
//!
//! The host player is modeled as a stream of named signals plus a
//! synchronous state snapshot sampled at delivery time. Trackers never talk
//! to the player directly; they see `(PlayerSignal, PlayerSnapshot)` pairs,
//! which keeps the session state machine deterministic under test.

use serde::{Deserialize, Serialize};

/// Lifecycle signals emitted by the host player
///
/// Delivered one at a time, in order, over a single channel. Signals carry
/// no positional data; that lives in the [`PlayerSnapshot`] sampled when the
/// signal is handled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerSignal {
    /// A new source started loading
    LoadStart,
    /// Source metadata (duration, source descriptor) became available
    MetadataLoaded,
    /// First frame of media data is available
    DataReady,
    /// Playback is actually rendering frames
    Playing,
    /// The play control was engaged (may be first play, seek recovery,
    /// or resume from pause)
    Play,
    /// The pause control was engaged
    Pause,
    /// A seek started
    Seeking,
    /// Playback halted waiting for data
    Waiting,
    /// Enough data buffered to play through
    CanPlayThrough,
    /// Periodic position tick
    TimeUpdate,
    /// Playback reached the end of the source
    Ended,
    /// Host playback error
    Error { message: String },
    /// The active source was replaced
    SourceChanged,
    /// The player is being torn down
    Disposed,
}

/// Player state sampled when a signal fires
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Current playback position in seconds
    pub position_secs: f64,
    /// Source duration in seconds; `None` when unknown or zero
    pub duration_secs: Option<f64>,
    /// Host ready-state level
    pub ready_state: u8,
    /// True while a position change is in progress
    pub seeking: bool,
    /// True while the user is dragging the seek bar
    pub scrubbing: bool,
    /// End of the buffered range in seconds, when the host exposes it
    pub buffered_end_secs: Option<f64>,
}

/// A signal paired with the player state sampled when it fired
///
/// The adapter builds the frame at emission time, so the state machine sees
/// exactly what the player looked like when the signal happened, regardless
/// of channel latency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalFrame {
    pub signal: PlayerSignal,
    pub snapshot: PlayerSnapshot,
}

impl SignalFrame {
    pub fn new(signal: PlayerSignal, snapshot: PlayerSnapshot) -> Self {
        Self { signal, snapshot }
    }
}

impl PlayerSnapshot {
    /// Playback percentage, rounded to the nearest whole percent
    ///
    /// `None` when duration is unknown or zero — callers must skip
    /// quartile computation for that tick rather than propagate NaN.
    pub fn percent(&self) -> Option<u32> {
        let duration = self.duration_secs?;
        if duration <= 0.0 || self.position_secs < 0.0 {
            return None;
        }
        Some((self.position_secs / duration * 100.0).round() as u32)
    }
}

impl Default for PlayerSnapshot {
    fn default() -> Self {
        Self {
            position_secs: 0.0,
            duration_secs: None,
            ready_state: 0,
            seeking: false,
            scrubbing: false,
            buffered_end_secs: None,
        }
    }
}
