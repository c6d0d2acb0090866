//! Startup latency measurement
//!
//! One-shot per source load: elapsed time between load initiation and first
//! frame data, reported on the first "playing" signal and latched until the
//! next load resets it.

use std::time::Instant;

/// Measures load-start to first-frame latency
#[derive(Debug, Clone, Copy)]
pub struct StartupLatencyTracker {
    load_started_at: Option<Instant>,
    seconds_to_load: Option<f64>,
    fired: bool,
}

impl StartupLatencyTracker {
    pub fn new() -> Self {
        Self {
            load_started_at: None,
            seconds_to_load: None,
            fired: false,
        }
    }

    /// A new source started loading; re-arms the tracker
    pub fn on_load_start(&mut self, now: Instant) {
        *self = Self::new();
        self.load_started_at = Some(now);
    }

    /// First frame of data is available
    pub fn on_data_ready(&mut self, now: Instant) {
        if let Some(started) = self.load_started_at {
            let elapsed = now.duration_since(started).as_secs_f64();
            self.seconds_to_load = Some((elapsed * 1000.0).round() / 1000.0);
        }
    }

    /// Playback is rendering; returns the startup latency exactly once per
    /// source load
    pub fn on_playing(&mut self) -> Option<f64> {
        if self.fired {
            return None;
        }
        self.fired = true;
        Some(self.seconds_to_load.unwrap_or(0.0))
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for StartupLatencyTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn measures_load_to_data_ready() {
        let mut tracker = StartupLatencyTracker::new();
        let start = Instant::now();

        tracker.on_load_start(start);
        tracker.on_data_ready(start + Duration::from_millis(740));

        let latency = tracker.on_playing().expect("first playing fires");
        assert!((latency - 0.74).abs() < 0.001);
    }

    #[test]
    fn fires_once_per_load() {
        let mut tracker = StartupLatencyTracker::new();
        let start = Instant::now();

        tracker.on_load_start(start);
        tracker.on_data_ready(start + Duration::from_millis(100));
        assert!(tracker.on_playing().is_some());
        assert!(tracker.on_playing().is_none());

        // A new load re-arms
        tracker.on_load_start(start + Duration::from_secs(5));
        tracker.on_data_ready(start + Duration::from_secs(6));
        assert!(tracker.on_playing().is_some());
    }

    #[test]
    fn playing_without_data_ready_reports_zero() {
        let mut tracker = StartupLatencyTracker::new();
        tracker.on_load_start(Instant::now());
        assert_eq!(tracker.on_playing(), Some(0.0));
    }
}
