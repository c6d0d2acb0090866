//! Quartile crossing tracker
//!
//! Maps playback percentage to crossed-quartile events: idempotent under
//! monotonic forward progress, re-armed under rewind. The rewind trigger
//! (raw position comparison) lives with the caller; this tracker only sees
//! rounded percentages, so a single-frame backward jump cannot double-fire
//! a quartile while a real rewind re-arms everything at or above the rewind
//! point.

use std::collections::BTreeSet;

use playtel_common::events::{QuartileDefinition, QuartileId, QuartilePolicy, QUARTILES};

/// Tracks which quartiles have been emitted for the current session
#[derive(Debug, Clone)]
pub struct QuartileTracker {
    policy: QuartilePolicy,
    sent: BTreeSet<QuartileId>,
}

impl QuartileTracker {
    pub fn new(policy: QuartilePolicy) -> Self {
        Self {
            policy,
            sent: BTreeSet::new(),
        }
    }

    pub fn policy(&self) -> QuartilePolicy {
        self.policy
    }

    /// Switch policy (decided per source at metadata load)
    pub fn set_policy(&mut self, policy: QuartilePolicy) {
        self.policy = policy;
    }

    /// Quartiles newly crossed at the given percentage, ascending threshold
    /// order, each at most once per forward traversal
    ///
    /// Under `Always`/`OnlyOnce` a jump past several thresholds catches up
    /// on all of them in a single call; under `NoSkip` only an exact
    /// threshold hit emits, so skipped quartiles are permanently missed.
    pub fn crossed(&mut self, percent: u32) -> Vec<QuartileDefinition> {
        let mut events = Vec::new();

        for quartile in &QUARTILES {
            if self.sent.contains(&quartile.id) {
                continue;
            }

            let hit = match self.policy {
                QuartilePolicy::NoSkip => percent == quartile.threshold,
                QuartilePolicy::Always | QuartilePolicy::OnlyOnce => percent >= quartile.threshold,
            };

            if hit {
                self.sent.insert(quartile.id);
                events.push(*quartile);
            }
        }

        events
    }

    /// Re-arm every quartile whose threshold is at or above the given
    /// percentage, so it can fire again once re-reached after a rewind
    pub fn rearm_at_or_above(&mut self, percent: u32) {
        self.sent.retain(|id| {
            QUARTILES
                .iter()
                .find(|quartile| quartile.id == *id)
                .map(|quartile| quartile.threshold < percent)
                .unwrap_or(false)
        });
    }

    /// Number of quartiles emitted so far
    pub fn sent_count(&self) -> usize {
        self.sent.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_progress_fires_each_quartile_once() {
        let mut tracker = QuartileTracker::new(QuartilePolicy::Always);

        assert!(tracker.crossed(10).is_empty());
        let crossed = tracker.crossed(25);
        assert_eq!(crossed.len(), 1);
        assert_eq!(crossed[0].id, QuartileId::First);

        // Same percentage again: nothing new
        assert!(tracker.crossed(25).is_empty());
        assert!(tracker.crossed(30).is_empty());

        let crossed = tracker.crossed(50);
        assert_eq!(crossed.len(), 1);
        assert_eq!(crossed[0].id, QuartileId::Mid);
    }

    #[test]
    fn jump_past_multiple_quartiles_catches_up_in_order() {
        let mut tracker = QuartileTracker::new(QuartilePolicy::Always);

        let crossed = tracker.crossed(80);
        let ids: Vec<QuartileId> = crossed.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![QuartileId::First, QuartileId::Mid, QuartileId::Third]);

        let crossed = tracker.crossed(100);
        let ids: Vec<QuartileId> = crossed.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![QuartileId::Complete]);
    }

    #[test]
    fn no_skip_requires_exact_threshold() {
        let mut tracker = QuartileTracker::new(QuartilePolicy::NoSkip);

        // 10% -> 60% jump: 25 and 50 were skipped, neither fires
        assert!(tracker.crossed(10).is_empty());
        assert!(tracker.crossed(60).is_empty());

        // Landing exactly on 75 fires ThirdQuartile
        let crossed = tracker.crossed(75);
        assert_eq!(crossed.len(), 1);
        assert_eq!(crossed[0].id, QuartileId::Third);
    }

    #[test]
    fn rearm_purges_thresholds_at_or_above_percent() {
        let mut tracker = QuartileTracker::new(QuartilePolicy::Always);
        tracker.crossed(80); // First, Mid, Third sent

        tracker.rearm_at_or_above(40);

        // First (25 < 40) stays sent; Mid and Third fire again
        let crossed = tracker.crossed(80);
        let ids: Vec<QuartileId> = crossed.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![QuartileId::Mid, QuartileId::Third]);
    }

    #[test]
    fn only_once_behaves_like_always() {
        let mut always = QuartileTracker::new(QuartilePolicy::Always);
        let mut only_once = QuartileTracker::new(QuartilePolicy::OnlyOnce);

        for percent in [10, 30, 60, 97] {
            assert_eq!(always.crossed(percent), only_once.crossed(percent));
        }
    }
}
