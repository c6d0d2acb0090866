//! Outbound event reporting
//!
//! Assembles the collector payload and ships it. The normal path is a
//! fire-and-forget POST spawned off the session task; the unload path is an
//! awaited, short-timeout POST carrying the `beacon=true` query marker and
//! the auth token in the body, since custom headers are unavailable on
//! beacon transports. Transport failures are logged and never retried —
//! the session is unaffected.

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use tracing::{debug, warn};

use playtel_common::TelemetryEvent;

use crate::config::TelemetryConfig;
use crate::error::Result;
use crate::player::Resolution;
use crate::session::BufferStats;

const USER_AGENT: &str = concat!("playtel/", env!("CARGO_PKG_VERSION"));

/// The final flush must not hang page teardown
const FINAL_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Current collector payload version
pub const PAYLOAD_VERSION: u32 = 2;

/// Content section of the outbound payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentInfo {
    pub id: String,
    pub drm_type: Option<String>,
    pub format_type: Option<String>,
    pub playback_url: Option<String>,
}

/// Playback section of the outbound payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackInfo {
    /// Current position, whole seconds
    pub position: u64,
    /// Wall-clock seconds since session start
    pub time_spent: u64,
    pub bitrate: Option<u64>,
    pub resolution: Option<Resolution>,
    /// Net watch time; attached only to the close payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_time: Option<u64>,
}

/// User section of the outbound payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub profile_id: String,
}

/// One outbound collector payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    pub content: ContentInfo,
    pub events: Vec<TelemetryEvent>,
    pub playback: PlaybackInfo,
    pub user: UserInfo,
    #[serde(rename = "playerID")]
    pub player_id: String,
    /// In-body auth token; beacon path only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    /// Attached when the batch carries a buffering event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_stats: Option<BufferStats>,
    pub version: u32,
}

/// Ships payloads to the collector
pub struct EventReporter {
    client: reqwest::Client,
    config: TelemetryConfig,
    /// Last payload shipped; lets an unload flush skip work an in-flight
    /// normal send already captured (soft guarantee only)
    last_payload: Option<serde_json::Value>,
}

impl EventReporter {
    pub fn new(config: TelemetryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            last_payload: None,
        })
    }

    /// Fire-and-forget report: the send is spawned and never awaited, so
    /// signal handling is never blocked on the network
    pub fn report(&mut self, payload: &Payload) {
        let body = match serde_json::to_value(payload) {
            Ok(body) => body,
            Err(error) => {
                warn!(%error, "failed to serialize telemetry payload");
                return;
            }
        };
        self.last_payload = Some(body.clone());

        let request = self.normal_post(&body);

        tokio::spawn(async move {
            match request.send().await {
                Ok(response) => {
                    debug!(status = %response.status(), "telemetry report delivered");
                }
                Err(error) => {
                    warn!(%error, "telemetry report failed");
                }
            }
        });
    }

    /// Unload-path report: awaited with a short timeout so teardown cannot
    /// hang, marked with the beacon query parameter
    pub async fn report_final(&mut self, payload: &Payload) {
        let body = match serde_json::to_value(payload) {
            Ok(body) => body,
            Err(error) => {
                warn!(%error, "failed to serialize final telemetry payload");
                return;
            }
        };

        if self.last_payload.as_ref() == Some(&body) {
            debug!("final payload already captured by an earlier report, skipping");
            return;
        }
        self.last_payload = Some(body.clone());

        let request = if self.config.beacon_on_unload {
            self.client.post(self.config.beacon_url()).json(&body)
        } else {
            self.normal_post(&body)
        };

        match tokio::time::timeout(FINAL_FLUSH_TIMEOUT, request.send()).await {
            Ok(Ok(response)) => {
                debug!(status = %response.status(), "final telemetry report delivered");
            }
            Ok(Err(error)) => {
                warn!(%error, "final telemetry report failed");
            }
            Err(_) => {
                warn!("final telemetry report timed out");
            }
        }
    }

    /// Normal-path POST: configured header overrides plus the
    /// Authorization token
    fn normal_post(&self, body: &serde_json::Value) -> reqwest::RequestBuilder {
        let mut request = self.client.post(&self.config.url).json(body);
        for (name, value) in &self.config.extra_headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(token) = &self.config.auth_token {
            request = request.header(AUTHORIZATION, token.as_str());
        }
        request
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }
}
