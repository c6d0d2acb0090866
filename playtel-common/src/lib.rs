//! # Playtel Common Library
//!
//! Shared vocabulary for the playback telemetry workspace:
//! - Telemetry event types (EventKind, TelemetryEvent, quartile table)
//! - Player lifecycle signals and the per-signal state snapshot
//! - Source descriptors
//! - Common error types

pub mod error;
pub mod events;
pub mod signal;
pub mod source;

pub use error::{Error, Result};
pub use events::{EventKind, QuartileDefinition, QuartileId, QuartilePolicy, TelemetryEvent};
pub use signal::{PlayerSignal, PlayerSnapshot, SignalFrame};
pub use source::SourceDescriptor;
