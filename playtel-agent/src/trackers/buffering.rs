//! Stall detection and classification
//!
//! A two-state machine per stall cycle: `Idle -> Stalled -> Idle`. A stall
//! opens on a host "waiting" signal at a nonzero position and resolves on a
//! "can play through" signal whose buffered position differs from where the
//! stall was recorded. Stalls caused by the user dragging the seek bar are
//! flagged, not suppressed, so QoE dashboards can exclude them from
//! network-quality metrics.

use std::time::Instant;

/// Open stall bookkeeping; discarded after producing a report or on reset
#[derive(Debug, Clone, Copy)]
struct StallRecord {
    started_at: Instant,
    position_at_stall: u64,
    ready_state_at_stall: u8,
}

/// One resolved stall
#[derive(Debug, Clone, PartialEq)]
pub struct StallReport {
    /// Playback position when the stall resolved, whole seconds
    pub position_secs: u64,
    /// Host ready-state captured when the stall opened
    pub ready_state: u8,
    /// Stall duration, seconds, millisecond precision
    pub duration_secs: f64,
    /// Monotonic stall counter for the session (this stall included)
    pub stall_count: u32,
    /// True when the stall coincided with user scrubbing
    pub was_scrubbing: bool,
}

/// Detects stall intervals and aggregates a per-session stall counter
#[derive(Debug)]
pub struct BufferingMonitor {
    stall: Option<StallRecord>,
    scrubbing: bool,
    stall_count: u32,
}

impl BufferingMonitor {
    pub fn new() -> Self {
        Self {
            stall: None,
            scrubbing: false,
            stall_count: 0,
        }
    }

    /// Host reported playback waiting for data
    ///
    /// Opens a stall only when playback had started (`position > 0`) and no
    /// stall is already open.
    pub fn on_waiting(&mut self, now: Instant, position_secs: f64, ready_state: u8) {
        if self.stall.is_none() && position_secs > 0.0 {
            self.stall = Some(StallRecord {
                started_at: now,
                position_at_stall: position_secs.round() as u64,
                ready_state_at_stall: ready_state,
            });
        }
    }

    /// A seek started; does not itself open a stall
    pub fn on_seeking(&mut self) {
        self.scrubbing = true;
    }

    /// Playback paused: any pending stall start is discarded, and whether
    /// the pause coincided with scrubbing is recorded
    pub fn on_pause(&mut self, scrubbing: bool) {
        self.stall = None;
        self.scrubbing = scrubbing;
    }

    /// Host reported enough data buffered to play through
    ///
    /// Resolves the open stall when the buffered position (buffered-range
    /// end when the host exposes one, otherwise the position recorded at
    /// stall start) differs from the current position.
    pub fn on_can_play_through(
        &mut self,
        now: Instant,
        position_secs: f64,
        buffered_end_secs: Option<f64>,
    ) -> Option<StallReport> {
        let current = position_secs.round() as u64;

        if let Some(record) = &mut self.stall {
            if let Some(end) = buffered_end_secs {
                record.position_at_stall = end.round() as u64;
            }
        }

        let mut report = None;
        if let Some(record) = self.stall {
            if current != record.position_at_stall {
                let duration = now.duration_since(record.started_at).as_secs_f64();
                self.stall = None;
                self.stall_count += 1;

                report = Some(StallReport {
                    position_secs: current,
                    ready_state: record.ready_state_at_stall,
                    duration_secs: (duration * 1000.0).round() / 1000.0,
                    stall_count: self.stall_count,
                    was_scrubbing: self.scrubbing,
                });
            }
        }

        if self.stall.is_none() {
            self.scrubbing = false;
        }

        report
    }

    /// Total stalls resolved this session
    pub fn stall_count(&self) -> u32 {
        self.stall_count
    }

    /// True while a stall is open
    pub fn is_stalled(&self) -> bool {
        self.stall.is_some()
    }

    /// Discard any in-flight stall unreported and zero all state
    pub fn reset(&mut self) {
        self.stall = None;
        self.scrubbing = false;
        self.stall_count = 0;
    }
}

impl Default for BufferingMonitor {
    fn default() -> Self {
        Self::new()
    }
}
