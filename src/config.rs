//! Process-wide client configuration.
//!
//! The dashboard this replaces hard-coded several backend hosts across its
//! page files. The base URL, request deadline, and token location live
//! here, read once at startup from `~/.orr/config.json` (every field has a
//! default, and `ORR_BASE_URL` overrides the file for local development).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::RetryPolicy;
use crate::error::PortalError;

/// Production portal host. Overridable via config file or `ORR_BASE_URL`.
pub const DEFAULT_BASE_URL: &str = "https://orr-backend.orr.solutions/admin-portal/v1/";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request deadline in seconds. 0 disables the deadline.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Override for the bearer-token file location.
    #[serde(default)]
    pub token_path: Option<PathBuf>,
    /// Backoff for transient read failures.
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_timeout_secs(),
            token_path: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl PortalConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

/// Canonical config file path (`~/.orr/config.json`).
pub fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".orr")
        .join("config.json")
}

/// Load configuration, falling back to defaults when no file exists.
pub fn load_config() -> Result<PortalConfig, PortalError> {
    load_config_from(&config_path())
}

/// Load configuration from an explicit path.
///
/// A missing file yields the defaults; a file that exists but does not
/// parse is an error, not a silent fallback.
pub fn load_config_from(path: &Path) -> Result<PortalConfig, PortalError> {
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)?
    } else {
        PortalConfig::default()
    };

    if let Ok(base_url) = std::env::var("ORR_BASE_URL") {
        if !base_url.trim().is_empty() {
            config.base_url = base_url;
        }
    }

    Ok(config)
}
