//! Session state machine
//!
//! Owns all per-session mutable state: the sequence counter, the four metric
//! trackers, pause/seek/first-play flags and the active source descriptor.
//! Every host signal goes through [`SessionState::handle_signal`], which is
//! pure of I/O: time and player state are passed in, and the result is an
//! [`Emission`] the caller ships. A source change fully resets the session;
//! [`SessionState::close`] latches it shut.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use playtel_common::events::{EventKind, TelemetryEvent};
use playtel_common::{PlayerSignal, PlayerSnapshot, QuartilePolicy, SourceDescriptor};

use crate::config::TelemetryConfig;
use crate::trackers::{
    BufferingMonitor, NetWatchTimeTracker, QuartileTracker, StallReport, StartupLatencyTracker,
};

/// Buffering statistics attached to payloads carrying a buffering event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BufferStats {
    /// Startup latency, attached to `StartBuffering`
    #[serde(rename_all = "camelCase")]
    Startup { seconds_to_load: f64 },
    /// Resolved stall, attached to `ReBuffering`
    #[serde(rename_all = "camelCase")]
    Rebuffer {
        current_time: u64,
        ready_state: u8,
        seconds_to_load: f64,
        buffer_count: u32,
        scrubbing: bool,
    },
}

/// Events produced by one host signal, reported together as one batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Emission {
    pub events: Vec<TelemetryEvent>,
    pub buffer_stats: Option<BufferStats>,
}

impl Emission {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// The final close event plus the metrics only the close payload carries
#[derive(Debug, Clone, PartialEq)]
pub struct CloseFlush {
    pub event: TelemetryEvent,
    pub net_watch_secs: u64,
}

/// Per-session telemetry state machine
pub struct SessionState {
    session_start: DateTime<Utc>,
    next_number: u64,
    quartiles: QuartileTracker,
    buffering: BufferingMonitor,
    net_time: NetWatchTimeTracker,
    startup: StartupLatencyTracker,
    paused: bool,
    seeking: bool,
    first_play: bool,
    last_position_secs: f64,
    last_snapshot: PlayerSnapshot,
    source: Option<SourceDescriptor>,
    heartbeat_enabled: bool,
    closed: bool,
    policy_override: Option<QuartilePolicy>,
    no_skip_networks: Vec<String>,
}

impl SessionState {
    pub fn new(config: &TelemetryConfig) -> Self {
        let policy = config.quartile_policy.unwrap_or_default();
        Self {
            session_start: Utc::now(),
            next_number: 1,
            quartiles: QuartileTracker::new(policy),
            buffering: BufferingMonitor::new(),
            net_time: NetWatchTimeTracker::new(),
            startup: StartupLatencyTracker::new(),
            paused: false,
            seeking: false,
            first_play: true,
            last_position_secs: 0.0,
            last_snapshot: PlayerSnapshot::default(),
            source: None,
            heartbeat_enabled: false,
            closed: false,
            policy_override: config.quartile_policy,
            no_skip_networks: config.no_skip_networks.clone(),
        }
    }

    /// Handle one host signal
    ///
    /// `snapshot` is the player state sampled when the signal fired;
    /// `current_source` is consulted on metadata load and source change.
    /// Events in the returned emission are sequence-numbered in generation
    /// order and must be reported as one batch.
    pub fn handle_signal(
        &mut self,
        signal: &PlayerSignal,
        snapshot: &PlayerSnapshot,
        current_source: Option<&SourceDescriptor>,
        now: Instant,
    ) -> Emission {
        if self.closed {
            return Emission::default();
        }

        // Disposal frames carry no player state; keep the last real
        // snapshot so the close payload reports the true final position
        if !matches!(signal, PlayerSignal::Disposed) {
            self.last_snapshot = *snapshot;
        }
        let mut emission = Emission::default();

        match signal {
            PlayerSignal::LoadStart => {
                self.startup.on_load_start(now);
                self.buffering.reset();
                self.net_time.reset();
            }

            PlayerSignal::MetadataLoaded => {
                self.source = current_source.cloned();
                self.quartiles.set_policy(self.resolve_policy());
                self.heartbeat_enabled = true;
                emission.events.push(self.next_event(EventKind::Start));
                info!(
                    policy = ?self.quartiles.policy(),
                    "session started"
                );
            }

            PlayerSignal::DataReady => {
                self.startup.on_data_ready(now);
            }

            PlayerSignal::Playing => {
                self.net_time.on_play(snapshot.position_secs);
                if let Some(seconds_to_load) = self.startup.on_playing() {
                    emission.events.push(self.next_event(EventKind::StartBuffering));
                    emission.buffer_stats = Some(BufferStats::Startup { seconds_to_load });
                }
            }

            PlayerSignal::Pause => {
                self.buffering.on_pause(snapshot.scrubbing);
                self.net_time.on_pause(snapshot.position_secs);

                let at_end = snapshot
                    .duration_secs
                    .map(|duration| snapshot.position_secs >= duration)
                    .unwrap_or(false);

                if at_end {
                    // End-of-content pause is not a user pause
                } else if snapshot.seeking {
                    self.seeking = true;
                } else {
                    self.paused = true;
                    emission.events.push(self.next_event(EventKind::Pause));
                }
            }

            PlayerSignal::Play => {
                if self.first_play {
                    self.first_play = false;
                } else if self.seeking {
                    self.seeking = false;
                } else if self.paused {
                    self.paused = false;
                    emission.events.push(self.next_event(EventKind::Resume));
                }
            }

            PlayerSignal::Seeking => {
                self.seeking = true;
                self.buffering.on_seeking();
            }

            PlayerSignal::Waiting => {
                self.buffering
                    .on_waiting(now, snapshot.position_secs, snapshot.ready_state);
            }

            PlayerSignal::CanPlayThrough => {
                if let Some(report) = self.buffering.on_can_play_through(
                    now,
                    snapshot.position_secs,
                    snapshot.buffered_end_secs,
                ) {
                    emission.events.push(self.next_event(EventKind::ReBuffering));
                    emission.buffer_stats = Some(stall_stats(&report));
                }
            }

            PlayerSignal::TimeUpdate => {
                self.on_time_update(snapshot, &mut emission);
            }

            PlayerSignal::Ended => {
                self.heartbeat_enabled = false;
                self.buffering.reset();
            }

            PlayerSignal::Error { message } => {
                emission.events.push(TelemetryEvent::with_value(
                    EventKind::PlaybackError,
                    self.take_number(),
                    serde_json::Value::String(message.clone()),
                ));
            }

            PlayerSignal::SourceChanged => {
                self.reset(current_source);
            }

            // The agent loop handles teardown via `close`
            PlayerSignal::Disposed => {}
        }

        if !emission.is_empty() {
            debug!(signal = ?signal, events = emission.events.len(), "signal emitted events");
        }

        emission
    }

    fn on_time_update(&mut self, snapshot: &PlayerSnapshot, emission: &mut Emission) {
        self.net_time.on_tick(snapshot.position_secs);

        if self
            .source
            .as_ref()
            .map(|source| source.is_broadcast)
            .unwrap_or(false)
        {
            return;
        }

        // Zero/unknown duration: skip the whole update rather than derive
        // a bogus percentage
        let Some(percent) = snapshot.percent() else {
            return;
        };

        // Rewind detection compares raw positions; the purge and the
        // emission predicate both work in rounded percent
        if self.last_position_secs > snapshot.position_secs {
            self.quartiles.rearm_at_or_above(percent);
        }

        for quartile in self.quartiles.crossed(percent) {
            emission.events.push(TelemetryEvent::with_value(
                EventKind::Quartile(quartile.id),
                self.take_number(),
                serde_json::Value::from(quartile.threshold),
            ));
        }

        self.last_position_secs = snapshot.position_secs;
    }

    /// Heartbeat event, when the session is live
    pub fn heartbeat(&mut self) -> Option<TelemetryEvent> {
        if !self.heartbeat_enabled || self.closed {
            return None;
        }
        Some(self.next_event(EventKind::Heartbeat))
    }

    /// Produce the final close event and latch the session shut
    ///
    /// Returns `None` if the session was already closed; nothing can be
    /// emitted afterwards.
    pub fn close(&mut self) -> Option<CloseFlush> {
        if self.closed {
            return None;
        }

        let event = self.next_event(EventKind::Close);
        let net_watch_secs = self.net_time.total(self.last_snapshot.position_secs);
        self.closed = true;
        self.heartbeat_enabled = false;
        info!(net_watch_secs, "session closed");

        Some(CloseFlush { event, net_watch_secs })
    }

    /// Full reset for a source change: sequence restarts at 1, trackers are
    /// recreated, flags reinitialized
    fn reset(&mut self, current_source: Option<&SourceDescriptor>) {
        info!("session reset on source change");
        self.session_start = Utc::now();
        self.next_number = 1;
        self.quartiles = QuartileTracker::new(self.policy_override.unwrap_or_default());
        self.buffering = BufferingMonitor::new();
        self.net_time = NetWatchTimeTracker::new();
        self.startup = StartupLatencyTracker::new();
        self.paused = false;
        self.seeking = false;
        self.first_play = true;
        self.last_position_secs = 0.0;
        self.source = current_source.cloned();
        self.heartbeat_enabled = false;
    }

    /// Quartile policy for the active source: explicit override wins, then
    /// the no-skip network list, then the default
    fn resolve_policy(&self) -> QuartilePolicy {
        if let Some(policy) = self.policy_override {
            return policy;
        }

        let network_no_skip = self
            .source
            .as_ref()
            .and_then(|source| source.network.as_deref())
            .map(|network| self.no_skip_networks.iter().any(|n| n == network))
            .unwrap_or(false);

        if network_no_skip {
            QuartilePolicy::NoSkip
        } else {
            QuartilePolicy::default()
        }
    }

    fn take_number(&mut self) -> u64 {
        let number = self.next_number;
        self.next_number += 1;
        number
    }

    fn next_event(&mut self, kind: EventKind) -> TelemetryEvent {
        let number = self.take_number();
        TelemetryEvent::new(kind, number)
    }

    pub fn session_start(&self) -> DateTime<Utc> {
        self.session_start
    }

    /// Whole seconds since the session started
    pub fn time_spent_secs(&self) -> u64 {
        (Utc::now() - self.session_start).num_seconds().max(0) as u64
    }

    pub fn source(&self) -> Option<&SourceDescriptor> {
        self.source.as_ref()
    }

    /// Player state from the most recent signal
    pub fn last_snapshot(&self) -> &PlayerSnapshot {
        &self.last_snapshot
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn quartiles_sent(&self) -> usize {
        self.quartiles.sent_count()
    }
}

fn stall_stats(report: &StallReport) -> BufferStats {
    BufferStats::Rebuffer {
        current_time: report.position_secs,
        ready_state: report.ready_state,
        seconds_to_load: report.duration_secs,
        buffer_count: report.stall_count,
        scrubbing: report.was_scrubbing,
    }
}
