//! Scripted playback session simulator
//!
//! Drives a fake player through a representative session — load, startup,
//! quartile progress, a pause/resume, a mid-session seek, one rebuffer
//! cycle — and ships the resulting telemetry to a collector. Useful for
//! watching what a collector receives without a real player.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::sleep;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use playtel_agent::{PlaybackStats, PlayerProbe, Resolution, TelemetryAgent, TelemetryConfig};
use playtel_common::{PlayerSignal, PlayerSnapshot, SourceDescriptor};

/// Command-line arguments for the simulator
#[derive(Parser, Debug)]
#[command(name = "simulate")]
#[command(about = "Drive a scripted playback session against a telemetry collector")]
#[command(version)]
struct Args {
    /// Collector endpoint
    #[arg(short, long, default_value = "http://localhost:8889", env = "PLAYTEL_URL")]
    url: String,

    /// Content identifier reported in payloads
    #[arg(long, default_value = "content1234")]
    content_id: String,

    /// Viewer profile identifier reported in payloads
    #[arg(long, default_value = "prof1234")]
    profile_id: String,

    /// Simulated source duration in seconds
    #[arg(long, default_value = "120")]
    duration: u64,

    /// Wall-clock milliseconds between simulated one-second ticks
    #[arg(long, default_value = "20")]
    tick_ms: u64,
}

/// Fixed fake player: one HLS source, constant decoder stats
struct ScriptedPlayer;

impl PlayerProbe for ScriptedPlayer {
    fn current_source(&self) -> Option<SourceDescriptor> {
        Some(SourceDescriptor {
            mime_type: "application/x-mpegurl".to_string(),
            url: Some("https://cdn.example/master.m3u8".to_string()),
            network: None,
            is_broadcast: false,
            protected: false,
            key_systems: Vec::new(),
        })
    }

    fn stats(&self) -> PlaybackStats {
        PlaybackStats {
            bitrate: Some(4_500_000),
            resolution: Some(Resolution { width: 1920, height: 1080 }),
        }
    }

    fn supported_drm(&self) -> Vec<String> {
        Vec::new()
    }
}

fn snapshot(position: f64, duration: u64) -> PlayerSnapshot {
    PlayerSnapshot {
        position_secs: position,
        duration_secs: Some(duration as f64),
        ready_state: 4,
        seeking: false,
        scrubbing: false,
        buffered_end_secs: None,
    }
}

async fn drive(agent: &TelemetryAgent, args: &Args) -> Result<()> {
    let duration = args.duration;
    let tick = Duration::from_millis(args.tick_ms);

    // Load and startup
    agent.deliver(PlayerSignal::LoadStart, snapshot(0.0, duration))?;
    sleep(Duration::from_millis(120)).await;
    agent.deliver(PlayerSignal::MetadataLoaded, snapshot(0.0, duration))?;
    agent.deliver(PlayerSignal::DataReady, snapshot(0.0, duration))?;
    agent.deliver(PlayerSignal::Play, snapshot(0.0, duration))?;
    agent.deliver(PlayerSignal::Playing, snapshot(0.0, duration))?;

    // First third of the content
    let pause_at = duration / 3;
    for position in 1..=pause_at {
        agent.deliver(PlayerSignal::TimeUpdate, snapshot(position as f64, duration))?;
        sleep(tick).await;
    }

    // Pause and resume
    agent.deliver(PlayerSignal::Pause, snapshot(pause_at as f64, duration))?;
    sleep(Duration::from_millis(300)).await;
    agent.deliver(PlayerSignal::Play, snapshot(pause_at as f64, duration))?;
    agent.deliver(PlayerSignal::Playing, snapshot(pause_at as f64, duration))?;

    // Seek forward to the last quarter
    let seek_to = duration * 3 / 4;
    agent.deliver(PlayerSignal::Seeking, snapshot(pause_at as f64, duration))?;
    agent.deliver(PlayerSignal::Play, snapshot(seek_to as f64, duration))?;

    // One rebuffer cycle right after the seek
    agent.deliver(PlayerSignal::Waiting, snapshot(seek_to as f64, duration))?;
    sleep(Duration::from_millis(400)).await;
    let mut buffered = snapshot(seek_to as f64, duration);
    buffered.buffered_end_secs = Some((seek_to + 10) as f64);
    agent.deliver(PlayerSignal::CanPlayThrough, buffered)?;
    agent.deliver(PlayerSignal::Playing, snapshot(seek_to as f64, duration))?;

    // Play out to the end
    for position in seek_to..=duration {
        agent.deliver(PlayerSignal::TimeUpdate, snapshot(position as f64, duration))?;
        sleep(tick).await;
    }
    agent.deliver(PlayerSignal::Ended, snapshot(duration as f64, duration))?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playtel_agent=debug,simulate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = TelemetryConfig {
        url: args.url.clone(),
        content_id: args.content_id.clone(),
        profile_id: args.profile_id.clone(),
        ..Default::default()
    };

    info!(url = %config.url, duration = args.duration, "starting scripted session");

    let agent = TelemetryAgent::spawn(Box::new(ScriptedPlayer), config)
        .context("failed to spawn telemetry agent")?;

    drive(&agent, &args).await.context("scripted session failed")?;
    agent.dispose().await;

    info!("scripted session complete");
    Ok(())
}
