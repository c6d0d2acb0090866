//! The telemetry agent task
//!
//! One tokio task owns the session: signals arrive over a single channel,
//! the heartbeat interval lives inside the loop (breaking the loop cancels
//! it deterministically), and teardown flushes exactly one final close
//! report through the unload path. No handler runs after disposal
//! completes.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use playtel_common::{PlayerSignal, PlayerSnapshot, SignalFrame};

use crate::config::TelemetryConfig;
use crate::drm;
use crate::error::{Error, Result};
use crate::player::PlayerProbe;
use crate::reporter::{
    ContentInfo, EventReporter, Payload, PlaybackInfo, UserInfo, PAYLOAD_VERSION,
};
use crate::session::{Emission, SessionState};

/// Handle to a running telemetry session
///
/// Created by [`TelemetryAgent::spawn`]. The host adapter delivers signal
/// frames through [`TelemetryAgent::deliver`]; [`TelemetryAgent::dispose`]
/// tears the session down and awaits the final flush.
pub struct TelemetryAgent {
    signals: mpsc::UnboundedSender<SignalFrame>,
    task: Option<JoinHandle<()>>,
}

impl TelemetryAgent {
    /// Start a telemetry session for the given player
    pub fn spawn(probe: Box<dyn PlayerProbe>, config: TelemetryConfig) -> Result<Self> {
        config.validate()?;
        let reporter = EventReporter::new(config.clone())?;
        let session = SessionState::new(&config);
        let (signals, receiver) = mpsc::unbounded_channel();

        let task = tokio::spawn(run_session(session, reporter, probe, receiver, config));

        Ok(Self {
            signals,
            task: Some(task),
        })
    }

    /// Deliver one host signal with the player state sampled when it fired
    pub fn deliver(&self, signal: PlayerSignal, snapshot: PlayerSnapshot) -> Result<()> {
        self.signals
            .send(SignalFrame::new(signal, snapshot))
            .map_err(|_| Error::Channel("session task stopped".to_string()))
    }

    /// Sender for host adapters that forward frames themselves
    pub fn sender(&self) -> mpsc::UnboundedSender<SignalFrame> {
        self.signals.clone()
    }

    /// Tear the session down: unsubscribes the channel, cancels the
    /// heartbeat, flushes the final close report, and awaits the task
    pub async fn dispose(mut self) {
        let _ = self.signals.send(SignalFrame::new(
            PlayerSignal::Disposed,
            PlayerSnapshot::default(),
        ));
        if let Some(task) = self.task.take() {
            if let Err(error) = task.await {
                warn!(%error, "session task join failed");
            }
        }
    }
}

async fn run_session(
    mut session: SessionState,
    mut reporter: EventReporter,
    probe: Box<dyn PlayerProbe>,
    mut signals: mpsc::UnboundedReceiver<SignalFrame>,
    config: TelemetryConfig,
) {
    let period = Duration::from_secs(config.heartbeat_interval_secs);
    let mut heartbeat = tokio::time::interval_at(tokio::time::Instant::now() + period, period);

    info!(url = %config.url, "telemetry agent started");

    loop {
        tokio::select! {
            frame = signals.recv() => {
                let Some(frame) = frame else {
                    // All senders dropped: treat as disposal
                    break;
                };

                let disposed = matches!(frame.signal, PlayerSignal::Disposed);
                let source = probe.current_source();
                let emission = session.handle_signal(
                    &frame.signal,
                    &frame.snapshot,
                    source.as_ref(),
                    Instant::now(),
                );

                // First heartbeat counts from metadata load, not agent start
                if matches!(frame.signal, PlayerSignal::MetadataLoaded) {
                    heartbeat.reset();
                }

                if !emission.is_empty() {
                    let payload =
                        build_payload(&session, &config, probe.as_ref(), emission, None, false);
                    reporter.report(&payload);
                }

                if disposed {
                    break;
                }
            }
            _ = heartbeat.tick() => {
                if let Some(event) = session.heartbeat() {
                    let emission = Emission { events: vec![event], buffer_stats: None };
                    let payload =
                        build_payload(&session, &config, probe.as_ref(), emission, None, false);
                    reporter.report(&payload);
                }
            }
        }
    }

    // Exactly one close event, shipped through the unload path with the
    // net watch time attached
    if let Some(flush) = session.close() {
        let emission = Emission {
            events: vec![flush.event],
            buffer_stats: None,
        };
        let payload = build_payload(
            &session,
            &config,
            probe.as_ref(),
            emission,
            Some(flush.net_watch_secs),
            config.beacon_on_unload,
        );
        reporter.report_final(&payload).await;
    }

    info!("telemetry agent disposed");
}

fn build_payload(
    session: &SessionState,
    config: &TelemetryConfig,
    probe: &dyn PlayerProbe,
    emission: Emission,
    net_time: Option<u64>,
    include_auth: bool,
) -> Payload {
    let source = session.source().cloned().or_else(|| probe.current_source());
    let types = drm::detect(source.as_ref(), &probe.supported_drm());
    let stats = probe.stats();
    let snapshot = session.last_snapshot();

    Payload {
        content: ContentInfo {
            id: config.content_id.clone(),
            drm_type: types.drm_type,
            format_type: types.format_type,
            playback_url: source.and_then(|s| s.url),
        },
        events: emission.events,
        playback: PlaybackInfo {
            position: snapshot.position_secs.max(0.0).round() as u64,
            time_spent: session.time_spent_secs(),
            bitrate: stats.bitrate,
            resolution: stats.resolution,
            net_time,
        },
        user: UserInfo {
            profile_id: config.profile_id.clone(),
        },
        player_id: config.player_id.clone(),
        auth_token: if include_auth {
            config.auth_token.clone()
        } else {
            None
        },
        buffer_stats: emission.buffer_stats,
        version: PAYLOAD_VERSION,
    }
}
