//! Telemetry event types
//!
//! The closed set of events the collector understands, plus the static
//! quartile table. Wire names match the collector protocol (`version: 2`).

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Playback-progress milestone identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuartileId {
    First,
    Mid,
    Third,
    Complete,
}

/// A quartile milestone: identifier plus percentage threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuartileDefinition {
    pub id: QuartileId,
    pub threshold: u32,
}

/// Static quartile table, ascending threshold order, shared across sessions
pub const QUARTILES: [QuartileDefinition; 4] = [
    QuartileDefinition { id: QuartileId::First, threshold: 25 },
    QuartileDefinition { id: QuartileId::Mid, threshold: 50 },
    QuartileDefinition { id: QuartileId::Third, threshold: 75 },
    QuartileDefinition { id: QuartileId::Complete, threshold: 95 },
];

/// Quartile emission policy
///
/// `OnlyOnce` is accepted in configuration but currently behaves exactly
/// like `Always`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuartilePolicy {
    /// `percent >= threshold` — a seek past several quartiles catches up
    /// on all of them in one batch
    Always,
    /// `percent == threshold` exactly — quartiles skipped by a seek are
    /// permanently missed
    NoSkip,
    /// Treated as `Always`
    OnlyOnce,
}

impl Default for QuartilePolicy {
    fn default() -> Self {
        QuartilePolicy::Always
    }
}

/// Telemetry event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Start,
    Pause,
    Resume,
    Quartile(QuartileId),
    Heartbeat,
    StartBuffering,
    ReBuffering,
    PlaybackError,
    Close,
}

impl EventKind {
    /// Collector wire name for this event kind
    pub fn wire_name(&self) -> &'static str {
        match self {
            EventKind::Start => "Start",
            EventKind::Pause => "Pause",
            EventKind::Resume => "Resume",
            EventKind::Quartile(QuartileId::First) => "FirstQuartile",
            EventKind::Quartile(QuartileId::Mid) => "Midpoint",
            EventKind::Quartile(QuartileId::Third) => "ThirdQuartile",
            EventKind::Quartile(QuartileId::Complete) => "Complete",
            EventKind::Heartbeat => "StreamingProgress",
            EventKind::StartBuffering => "StartBuffering",
            EventKind::ReBuffering => "ReBuffering",
            EventKind::PlaybackError => "PlaybackError",
            EventKind::Close => "Close",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// One emitted telemetry event
///
/// Created by the session state machine, never mutated afterwards.
/// `number` is the per-session sequence number, strictly increasing,
/// starting at 1.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryEvent {
    pub name: EventKind,
    pub number: u64,
    pub value: Option<serde_json::Value>,
}

impl TelemetryEvent {
    pub fn new(name: EventKind, number: u64) -> Self {
        Self { name, number, value: None }
    }

    pub fn with_value(name: EventKind, number: u64, value: serde_json::Value) -> Self {
        Self { name, number, value: Some(value) }
    }
}

impl Serialize for TelemetryEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let fields = if self.value.is_some() { 3 } else { 2 };
        let mut state = serializer.serialize_struct("TelemetryEvent", fields)?;
        state.serialize_field("name", self.name.wire_name())?;
        state.serialize_field("number", &self.number)?;
        if let Some(value) = &self.value {
            state.serialize_field("value", value)?;
        }
        state.end()
    }
}
