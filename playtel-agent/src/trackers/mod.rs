//! Per-session metric trackers
//!
//! Each tracker is a small explicit state machine with pure transition
//! functions: time and position are passed in, never sampled inside. The
//! session state machine owns one of each and feeds them from player
//! signals.

pub mod buffering;
pub mod net_time;
pub mod quartile;
pub mod startup;

pub use buffering::{BufferingMonitor, StallReport};
pub use net_time::NetWatchTimeTracker;
pub use quartile::QuartileTracker;
pub use startup::StartupLatencyTracker;
