//! Shared test infrastructure: a fake player probe and an in-process
//! capture collector that records every payload the agent ships.

// Not every test binary uses every helper
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};

use playtel_agent::{PlaybackStats, PlayerProbe, Resolution};
use playtel_common::{PlayerSnapshot, SourceDescriptor};

/// One payload as received by the capture collector
#[derive(Debug, Clone)]
pub struct ReceivedReport {
    pub body: serde_json::Value,
    pub beacon: bool,
    /// Request headers, lowercased names
    pub headers: HashMap<String, String>,
}

impl ReceivedReport {
    /// Wire names of the events in this payload, in order
    pub fn event_names(&self) -> Vec<String> {
        self.body["events"]
            .as_array()
            .map(|events| {
                events
                    .iter()
                    .map(|e| e["name"].as_str().unwrap_or_default().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn auth_header(&self) -> Option<&str> {
        self.headers.get("authorization").map(String::as_str)
    }

    pub fn event_numbers(&self) -> Vec<u64> {
        self.body["events"]
            .as_array()
            .map(|events| {
                events
                    .iter()
                    .map(|e| e["number"].as_u64().unwrap_or_default())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Handle to the payloads recorded by the capture collector
#[derive(Clone, Default)]
pub struct Collector {
    reports: Arc<Mutex<Vec<ReceivedReport>>>,
}

impl Collector {
    pub fn reports(&self) -> Vec<ReceivedReport> {
        self.reports.lock().unwrap().clone()
    }

    pub fn report_count(&self) -> usize {
        self.reports.lock().unwrap().len()
    }

    /// All event wire names across every report, in arrival order
    pub fn all_event_names(&self) -> Vec<String> {
        self.reports().iter().flat_map(|r| r.event_names()).collect()
    }

    /// Poll until at least `count` reports arrived; panics on timeout
    pub async fn wait_for_reports(&self, count: usize) {
        for _ in 0..300 {
            if self.report_count() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "expected at least {} reports, collector has {}",
            count,
            self.report_count()
        );
    }
}

async fn ingest(
    State(collector): State<Collector>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> StatusCode {
    let report = ReceivedReport {
        body,
        beacon: params.get("beacon").map(|v| v == "true").unwrap_or(false),
        headers: headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect(),
    };
    collector.reports.lock().unwrap().push(report);
    StatusCode::NO_CONTENT
}

/// Start an in-process collector; returns its URL and the capture handle
pub async fn start_collector() -> (String, Collector) {
    let collector = Collector::default();
    let app = Router::new()
        .route("/", post(ingest))
        .with_state(collector.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind capture collector");
    let addr = listener.local_addr().expect("collector addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("capture collector");
    });

    (format!("http://{}", addr), collector)
}

#[derive(Debug, Default)]
struct FakePlayerInner {
    source: Option<SourceDescriptor>,
    stats: PlaybackStats,
    supported_drm: Vec<String>,
}

/// Shared-state fake player probe; clones see the same inner state
#[derive(Clone, Default)]
pub struct FakePlayer {
    inner: Arc<Mutex<FakePlayerInner>>,
}

impl FakePlayer {
    pub fn with_source(source: SourceDescriptor) -> Self {
        let player = Self::default();
        player.set_source(Some(source));
        player
    }

    pub fn set_source(&self, source: Option<SourceDescriptor>) {
        self.inner.lock().unwrap().source = source;
    }

    pub fn set_stats(&self, stats: PlaybackStats) {
        self.inner.lock().unwrap().stats = stats;
    }

    pub fn set_supported_drm(&self, key_systems: Vec<String>) {
        self.inner.lock().unwrap().supported_drm = key_systems;
    }
}

impl PlayerProbe for FakePlayer {
    fn current_source(&self) -> Option<SourceDescriptor> {
        self.inner.lock().unwrap().source.clone()
    }

    fn stats(&self) -> PlaybackStats {
        self.inner.lock().unwrap().stats
    }

    fn supported_drm(&self) -> Vec<String> {
        self.inner.lock().unwrap().supported_drm.clone()
    }
}

/// Snapshot at a position within a fixed-duration source
pub fn snapshot(position: f64, duration: f64) -> PlayerSnapshot {
    PlayerSnapshot {
        position_secs: position,
        duration_secs: Some(duration),
        ready_state: 4,
        seeking: false,
        scrubbing: false,
        buffered_end_secs: None,
    }
}

/// Plain unprotected HLS source
pub fn hls_source() -> SourceDescriptor {
    SourceDescriptor {
        mime_type: "application/x-mpegurl".to_string(),
        url: Some("https://cdn.example/master.m3u8".to_string()),
        network: None,
        is_broadcast: false,
        protected: false,
        key_systems: Vec::new(),
    }
}

/// Default stats the fake player reports
pub fn hd_stats() -> PlaybackStats {
    PlaybackStats {
        bitrate: Some(4_500_000),
        resolution: Some(Resolution { width: 1920, height: 1080 }),
    }
}
