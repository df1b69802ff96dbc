//! Bearer-token storage.
//!
//! The portal's login flow writes the token; this layer only reads it and
//! attaches it as `Authorization: Bearer <token>`. Both `token` and
//! `access_token` spellings are accepted on read.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::PortalError;

/// Persisted bearer token for the admin portal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalToken {
    #[serde(alias = "access_token")]
    pub token: String,
    /// Authenticated account email, when the login flow recorded one.
    #[serde(default, alias = "email")]
    pub account: Option<String>,
    /// RFC 3339 expiry stamp, when the login flow recorded one.
    #[serde(default)]
    pub expiry: Option<String>,
}

impl PortalToken {
    /// Check the expiry stamp with a 60-second skew window.
    ///
    /// No stamp means the token is served as-is; an unparseable stamp is
    /// treated as expired.
    pub fn is_expired(&self) -> bool {
        match &self.expiry {
            None => false,
            Some(stamp) => match chrono::DateTime::parse_from_rfc3339(stamp) {
                Ok(expiry) => expiry <= chrono::Utc::now() + chrono::Duration::seconds(60),
                Err(_) => true,
            },
        }
    }
}

/// Read side of token storage. The token is external state owned by the
/// login flow; implementations must not mint or mutate it.
pub trait TokenProvider: Send + Sync {
    /// The current bearer token, if any.
    fn bearer_token(&self) -> Option<String>;
}

/// Fixed token, for tests and embedding scenarios.
pub struct StaticToken {
    token: Option<String>,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// Anonymous access: no Authorization header is sent.
    pub fn none() -> Self {
        Self { token: None }
    }
}

impl TokenProvider for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }
}

/// Token store backed by a JSON file, loaded once at construction.
pub struct FileTokenStore {
    path: PathBuf,
    cached: Mutex<Option<PortalToken>>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cached = match load_token_file(&path) {
            Ok(token) => token,
            Err(error) => {
                log::warn!("failed to read token at {}: {error}", path.display());
                None
            }
        };
        Self {
            path,
            cached: Mutex::new(cached),
        }
    }

    /// Open the default store at `~/.orr/token.json`.
    pub fn open_default() -> Self {
        Self::new(token_path())
    }

    /// Re-read the token file (after a login elsewhere in the app).
    pub fn reload(&self) -> Result<(), PortalError> {
        let token = load_token_file(&self.path)?;
        let mut guard = self
            .cached
            .lock()
            .map_err(|_| PortalError::InvalidRequest("token cache lock poisoned".to_string()))?;
        *guard = token;
        Ok(())
    }
}

impl TokenProvider for FileTokenStore {
    fn bearer_token(&self) -> Option<String> {
        let guard = self.cached.lock().ok()?;
        let token = guard.as_ref()?;
        if token.is_expired() {
            log::warn!(
                "bearer token at {} is past its expiry stamp",
                self.path.display()
            );
        }
        Some(token.token.clone())
    }
}

/// Canonical token file path (`~/.orr/token.json`).
pub fn token_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".orr")
        .join("token.json")
}

fn load_token_file(path: &Path) -> Result<Option<PortalToken>, PortalError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    let token: PortalToken = serde_json::from_str(&content)?;
    Ok(Some(token))
}

/// Persist a token (used by login flows).
pub fn save_token(path: &Path, token: &PortalToken) -> Result<(), PortalError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(token)?;
    std::fs::write(path, content)?;
    Ok(())
}
