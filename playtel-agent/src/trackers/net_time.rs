//! Net watch time accounting
//!
//! Accumulates whole seconds of genuine forward playback, excluding time
//! spent paused, stalled or scrubbing. Positions are floored to whole
//! seconds; a tick delta of 0 or 1 counts as continuous playback (sub-second
//! jitter is "no real progress yet"), anything else is a discontinuity: the
//! open interval is folded into the running total and a new interval starts
//! at the new position, so seeks are never counted as watched time.

/// Whole-second net watch time tracker
#[derive(Debug, Clone, Copy)]
pub struct NetWatchTimeTracker {
    accumulated: u64,
    interval_start: u64,
    interval_last: u64,
}

impl NetWatchTimeTracker {
    pub fn new() -> Self {
        Self {
            accumulated: 0,
            interval_start: 0,
            interval_last: 0,
        }
    }

    fn fold(&mut self) {
        self.accumulated += self.interval_last.saturating_sub(self.interval_start);
    }

    fn restart_at(&mut self, position: u64) {
        self.interval_start = position;
        self.interval_last = position;
    }

    /// Playback started or resumed at the given position
    pub fn on_play(&mut self, position_secs: f64) {
        self.fold();
        self.restart_at(whole_secs(position_secs));
    }

    /// Periodic position sample during playback
    pub fn on_tick(&mut self, position_secs: f64) {
        let current = whole_secs(position_secs);
        let delta = current as i64 - self.interval_last as i64;

        if delta == 0 || delta == 1 {
            self.interval_last = current;
        } else {
            self.fold();
            self.restart_at(current);
        }
    }

    /// Playback paused at the given position
    pub fn on_pause(&mut self, position_secs: f64) {
        self.on_tick(position_secs);
        self.fold();
        self.restart_at(whole_secs(position_secs));
    }

    /// Accumulated seconds including the open interval
    ///
    /// Idempotent snapshot: folds the open interval and restarts it at the
    /// given position, so the tracker stays queryable.
    pub fn total(&mut self, position_secs: f64) -> u64 {
        self.fold();
        self.restart_at(whole_secs(position_secs));
        self.accumulated
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for NetWatchTimeTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn whole_secs(position_secs: f64) -> u64 {
    if position_secs <= 0.0 {
        0
    } else {
        position_secs.floor() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuous_ticks_accumulate() {
        let mut tracker = NetWatchTimeTracker::new();
        tracker.on_play(0.0);
        for position in [1.0, 2.0, 3.0] {
            tracker.on_tick(position);
        }
        tracker.on_pause(3.0);
        assert_eq!(tracker.total(3.0), 3);
    }

    #[test]
    fn seek_is_not_counted_as_watched_time() {
        let mut tracker = NetWatchTimeTracker::new();
        tracker.on_play(0.0);
        for position in [1.0, 2.0, 3.0] {
            tracker.on_tick(position);
        }
        tracker.on_pause(3.0);

        // Seek to 50, then two more seconds of playback: 3 + 2, not 52
        for position in [50.0, 51.0, 52.0] {
            tracker.on_tick(position);
        }
        assert_eq!(tracker.total(52.0), 5);
    }

    #[test]
    fn backward_seek_folds_interval() {
        let mut tracker = NetWatchTimeTracker::new();
        tracker.on_play(10.0);
        tracker.on_tick(11.0);
        tracker.on_tick(12.0);
        // Rewind: fold 2s, restart at 5
        tracker.on_tick(5.0);
        tracker.on_tick(6.0);
        assert_eq!(tracker.total(6.0), 3);
    }

    #[test]
    fn total_is_idempotent() {
        let mut tracker = NetWatchTimeTracker::new();
        tracker.on_play(0.0);
        tracker.on_tick(1.0);
        tracker.on_tick(2.0);
        assert_eq!(tracker.total(2.0), 2);
        assert_eq!(tracker.total(2.0), 2);
    }

    #[test]
    fn jitter_within_same_second_adds_nothing() {
        let mut tracker = NetWatchTimeTracker::new();
        tracker.on_play(5.0);
        tracker.on_tick(5.2);
        tracker.on_tick(5.8);
        assert_eq!(tracker.total(5.9), 0);
    }

    #[test]
    fn reset_zeroes_everything() {
        let mut tracker = NetWatchTimeTracker::new();
        tracker.on_play(0.0);
        tracker.on_tick(1.0);
        tracker.reset();
        assert_eq!(tracker.total(1.0), 0);
    }
}
