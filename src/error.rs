//! Error types for portal API calls.
//!
//! Errors are classified by recoverability:
//! - Network / Timeout: transient, safe to retry or refetch
//! - Api: the backend answered with a non-2xx status
//! - AuthExpired: the bearer token was rejected, re-login required

use std::time::Duration;

use thiserror::Error;

/// Error type shared by every portal request.
#[derive(Debug, Error)]
pub enum PortalError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("session expired or token rejected")]
    AuthExpired,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}

impl PortalError {
    /// Returns true if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            PortalError::Network(_) | PortalError::Timeout(_) => true,
            PortalError::Api { status, .. } => {
                *status == 408 || *status == 429 || (500..600).contains(status)
            }
            _ => false,
        }
    }
}

/// Ordered substring → friendly-message rules for backend error text.
///
/// The dashboard used to re-implement this matching in every quick-action
/// modal; it lives here so one failure produces one message everywhere.
/// First match wins, scanned against the lowercased server message.
const TRANSLATIONS: &[(&str, &str)] = &[
    (
        "duplicate key",
        "A record with these details already exists.",
    ),
    (
        "validation",
        "Some fields are invalid. Review the form and try again.",
    ),
    (
        "permission",
        "You do not have permission to perform this action.",
    ),
    ("not found", "The requested record no longer exists."),
];

/// Map an error to the message the UI should render.
///
/// Server-provided detail is preferred over generic text, but raw backend
/// phrases (`duplicate key`, `validation`, ...) are translated first.
pub fn friendly_message(error: &PortalError) -> String {
    match error {
        PortalError::Api { status, message } => {
            let lowered = message.to_lowercase();
            for (pattern, friendly) in TRANSLATIONS {
                if lowered.contains(pattern) {
                    return (*friendly).to_string();
                }
            }
            if message.trim().is_empty() {
                format!("Request failed (HTTP {status}).")
            } else {
                message.clone()
            }
        }
        PortalError::Network(_) => {
            "Could not reach the server. Check your connection and try again.".to_string()
        }
        PortalError::Timeout(_) => "The request took too long. Try again.".to_string(),
        PortalError::AuthExpired => "Your session has expired. Sign in again.".to_string(),
        PortalError::Json(_) => "The server returned an unexpected response.".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_key_is_translated() {
        let error = PortalError::Api {
            status: 400,
            message: "duplicate key value violates unique constraint \"clients_email_key\""
                .to_string(),
        };
        let message = friendly_message(&error);
        assert_eq!(message, "A record with these details already exists.");
        assert!(!message.to_lowercase().contains("duplicate key"));
    }

    #[test]
    fn test_translation_is_case_insensitive() {
        let error = PortalError::Api {
            status: 403,
            message: "Permission denied for this resource".to_string(),
        };
        assert_eq!(
            friendly_message(&error),
            "You do not have permission to perform this action."
        );
    }

    #[test]
    fn test_server_detail_passes_through_when_untranslated() {
        let error = PortalError::Api {
            status: 409,
            message: "Meeting is already confirmed".to_string(),
        };
        assert_eq!(friendly_message(&error), "Meeting is already confirmed");
    }

    #[test]
    fn test_empty_detail_falls_back_to_status() {
        let error = PortalError::Api {
            status: 502,
            message: String::new(),
        };
        assert_eq!(friendly_message(&error), "Request failed (HTTP 502).");
    }

    #[test]
    fn test_network_errors_get_generic_message() {
        let error = PortalError::Network("connection refused".to_string());
        assert_eq!(
            friendly_message(&error),
            "Could not reach the server. Check your connection and try again."
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(PortalError::Network("reset".into()).is_retryable());
        assert!(PortalError::Timeout(Duration::from_secs(30)).is_retryable());
        assert!(PortalError::Api {
            status: 503,
            message: String::new()
        }
        .is_retryable());
        assert!(PortalError::Api {
            status: 429,
            message: String::new()
        }
        .is_retryable());
        assert!(!PortalError::Api {
            status: 400,
            message: String::new()
        }
        .is_retryable());
        assert!(!PortalError::AuthExpired.is_retryable());
    }
}
