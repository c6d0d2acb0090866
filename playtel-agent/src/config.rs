//! Agent configuration
//!
//! Precedence follows the usual order: explicit caller overrides, then a
//! TOML config file, then compiled defaults. The collector endpoint can
//! also come from the `PLAYTEL_URL` environment variable.

use std::collections::HashMap;
use std::path::Path;

use playtel_common::{Error, QuartilePolicy, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Environment variable overriding the collector endpoint
pub const URL_ENV_VAR: &str = "PLAYTEL_URL";

const DEFAULT_URL: &str = "http://localhost:8889";
const DEFAULT_HEARTBEAT_SECS: u64 = 300; // 5 min
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Telemetry agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Collector endpoint
    pub url: String,
    /// Content identifier reported in payloads
    pub content_id: String,
    /// Viewer profile identifier reported in payloads
    pub profile_id: String,
    /// Player instance identifier; defaults to a fresh UUID
    pub player_id: String,
    /// Authorization header value for the normal path; embedded in the
    /// body on the beacon path
    pub auth_token: Option<String>,
    /// Additional request headers merged into every normal-path POST.
    /// The beacon path cannot carry custom headers
    pub extra_headers: HashMap<String, String>,
    /// Explicit quartile policy override; wins over the network list
    pub quartile_policy: Option<QuartilePolicy>,
    /// Networks whose sources are forced to the no-skip quartile policy
    pub no_skip_networks: Vec<String>,
    /// Heartbeat emission interval
    pub heartbeat_interval_secs: u64,
    /// Use the beacon-marked path for the final flush
    pub beacon_on_unload: bool,
    /// HTTP request timeout
    pub request_timeout_secs: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            content_id: "content1234".to_string(),
            profile_id: "prof1234".to_string(),
            player_id: Uuid::new_v4().to_string(),
            auth_token: None,
            extra_headers: HashMap::new(),
            quartile_policy: None,
            no_skip_networks: Vec::new(),
            heartbeat_interval_secs: DEFAULT_HEARTBEAT_SECS,
            beacon_on_unload: true,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl TelemetryConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("cannot parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration: file when given, defaults otherwise, with the
    /// `PLAYTEL_URL` environment variable overriding the endpoint
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Ok(url) = std::env::var(URL_ENV_VAR) {
            config.url = url;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(Error::Config(format!(
                "collector url must be http(s), got {:?}",
                self.url
            )));
        }
        if self.heartbeat_interval_secs == 0 {
            return Err(Error::Config(
                "heartbeat_interval_secs must be nonzero".to_string(),
            ));
        }
        Ok(())
    }

    /// Collector URL with the beacon marker appended
    pub fn beacon_url(&self) -> String {
        if self.url.contains('?') {
            format!("{}&beacon=true", self.url)
        } else {
            format!("{}?beacon=true", self.url)
        }
    }
}
