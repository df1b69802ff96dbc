//! The admin-portal API surface.
//!
//! One `Portal` per process: base URL and deadline from
//! [`crate::config::PortalConfig`], bearer token from a
//! [`crate::auth::TokenProvider`], I/O through a [`crate::transport::Transport`].
//! Typed clients (one per backend collection) sit on top of the generic
//! [`ResourceClient`].
//!
//! Modules:
//! - clients: client roster CRUD
//! - meetings: scheduling plus confirm/decline/reschedule/complete/cancel
//! - tickets: support queue plus add-message
//! - notifications: feed plus mark-read
//! - content: published material, multipart attachment upload
//! - billing: invoices (read-only here; issuing is a backend job)
//! - analytics: dashboard overview numbers

pub mod analytics;
pub mod billing;
pub mod clients;
pub mod content;
pub mod meetings;
pub mod notifications;
pub mod tickets;

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::auth::TokenProvider;
use crate::config::PortalConfig;
use crate::error::PortalError;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Method, Payload, Transport};

pub use analytics::AnalyticsApi;
pub use billing::BillingApi;
pub use clients::ClientsApi;
pub use content::ContentApi;
pub use meetings::MeetingsApi;
pub use notifications::NotificationsApi;
pub use tickets::TicketsApi;

/// Backoff settings for read-side retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    250
}

fn default_max_backoff_ms() -> u64 {
    2_000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

fn retry_delay(attempt: u32, policy: &RetryPolicy) -> Duration {
    let exponent = 2u64.saturating_pow(attempt.saturating_sub(1));
    let millis = policy
        .initial_backoff_ms
        .saturating_mul(exponent)
        .min(policy.max_backoff_ms);
    Duration::from_millis(millis)
}

fn retryable_status(status: u16) -> bool {
    status == 408 || status == 429 || (500..600).contains(&status)
}

/// Shared request plumbing behind every typed client.
pub(crate) struct PortalCore {
    base_url: Url,
    timeout: Option<Duration>,
    retry: RetryPolicy,
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenProvider>,
}

impl PortalCore {
    /// Join path segments onto the base URL, Django-style: every segment
    /// gets a trailing slash.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, PortalError> {
        let mut path = String::new();
        for segment in segments {
            let trimmed = segment.trim_matches('/');
            if trimmed.is_empty() {
                return Err(PortalError::InvalidRequest(
                    "empty path segment".to_string(),
                ));
            }
            path.push_str(trimmed);
            path.push('/');
        }
        self.base_url
            .join(&path)
            .map_err(|error| PortalError::InvalidRequest(format!("bad path {path:?}: {error}")))
    }

    /// Issue a request and return the parsed body.
    ///
    /// Transient failures (transport errors, 408/429/5xx) are retried with
    /// capped exponential backoff, but only for idempotent reads; writes
    /// get exactly one attempt.
    pub(crate) async fn request(
        &self,
        method: Method,
        url: Url,
        payload: Option<Payload>,
        idempotent: bool,
    ) -> Result<Value, PortalError> {
        let request = ApiRequest {
            method,
            url,
            bearer: self.tokens.bearer_token(),
            payload,
        };

        let attempts = if idempotent {
            self.retry.max_attempts.max(1)
        } else {
            1
        };

        for attempt in 1..=attempts {
            let outcome = self.execute_once(request.clone()).await;
            let transient = match &outcome {
                Ok(response) => !response.is_success() && retryable_status(response.status),
                Err(error) => error.is_retryable(),
            };
            if transient && attempt < attempts {
                let delay = retry_delay(attempt, &self.retry);
                log::warn!(
                    "{} {} attempt {}/{} failed, retrying in {:?}",
                    request.method.as_str(),
                    request.url,
                    attempt,
                    attempts,
                    delay
                );
                tokio::time::sleep(delay).await;
                continue;
            }
            return into_body(outcome?);
        }

        Err(PortalError::Network("request exhausted retries".to_string()))
    }

    async fn execute_once(&self, request: ApiRequest) -> Result<ApiResponse, PortalError> {
        let call = self.transport.execute(request);
        match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(PortalError::Timeout(limit)),
            },
            None => call.await,
        }
    }
}

fn into_body(response: ApiResponse) -> Result<Value, PortalError> {
    if response.status == 401 {
        return Err(PortalError::AuthExpired);
    }
    if !response.is_success() {
        return Err(PortalError::Api {
            status: response.status,
            message: extract_error_message(&response.body),
        });
    }
    Ok(response.body)
}

/// Pull the human-readable part out of an error body. Django-style
/// endpoints use `detail`; a few use `message` or `error`.
fn extract_error_message(body: &Value) -> String {
    for key in ["detail", "message", "error"] {
        if let Some(message) = body.get(key).and_then(Value::as_str) {
            return message.to_string();
        }
    }
    match body {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Entry point to the portal API.
pub struct Portal {
    core: Arc<PortalCore>,
}

impl Portal {
    /// Connect over HTTPS with the given configuration and token source.
    pub fn new(
        config: PortalConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, PortalError> {
        Self::with_transport(config, tokens, Arc::new(HttpTransport::new()))
    }

    /// Connect over a caller-supplied transport (tests, instrumentation).
    pub fn with_transport(
        config: PortalConfig,
        tokens: Arc<dyn TokenProvider>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, PortalError> {
        let base_url = parse_base_url(&config.base_url)?;
        Ok(Self {
            core: Arc::new(PortalCore {
                base_url,
                timeout: config.request_timeout(),
                retry: config.retry.clone(),
                transport,
                tokens,
            }),
        })
    }

    pub fn clients(&self) -> ClientsApi {
        ClientsApi::new(self.resource("clients"))
    }

    pub fn meetings(&self) -> MeetingsApi {
        MeetingsApi::new(self.resource("meetings"))
    }

    pub fn tickets(&self) -> TicketsApi {
        TicketsApi::new(self.resource("tickets"))
    }

    pub fn notifications(&self) -> NotificationsApi {
        NotificationsApi::new(self.resource("notifications"))
    }

    pub fn content(&self) -> ContentApi {
        ContentApi::new(self.resource("content"))
    }

    pub fn billing(&self) -> BillingApi {
        BillingApi::new(self.resource("billing"))
    }

    pub fn analytics(&self) -> AnalyticsApi {
        AnalyticsApi::new(self.core.clone())
    }

    /// Generic access to a collection, for endpoints that have no typed
    /// wrapper (yet).
    pub fn resource(&self, path: &str) -> ResourceClient {
        ResourceClient {
            core: self.core.clone(),
            path: path.to_string(),
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url, PortalError> {
    let mut normalized = raw.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Url::parse(&normalized).map_err(|error| PortalError::InvalidBaseUrl(format!("{raw}: {error}")))
}

/// CRUD plus named actions for one backend collection.
///
/// Methods return the raw parsed body: endpoints disagree about envelopes
/// (`[...]` vs `{"results": ...}` vs `{"data": ...}`), so unwrapping
/// belongs to the typed layer via [`crate::envelope`], not here.
pub struct ResourceClient {
    core: Arc<PortalCore>,
    path: String,
}

impl ResourceClient {
    /// `GET <base>/<resource>/?<filters>`
    pub async fn list(&self, filters: &crate::query::Filters) -> Result<Value, PortalError> {
        let mut url = self.core.endpoint(&[&self.path])?;
        if !filters.is_empty() {
            url.query_pairs_mut().extend_pairs(
                filters
                    .pairs()
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.as_str())),
            );
        }
        self.core.request(Method::Get, url, None, true).await
    }

    /// `GET <base>/<resource>/<id>/`
    pub async fn get(&self, id: impl Display + Send) -> Result<Value, PortalError> {
        let url = self.core.endpoint(&[&self.path, &id.to_string()])?;
        self.core.request(Method::Get, url, None, true).await
    }

    /// `POST <base>/<resource>/`
    pub async fn create(&self, payload: Payload) -> Result<Value, PortalError> {
        let url = self.core.endpoint(&[&self.path])?;
        self.core
            .request(Method::Post, url, Some(payload), false)
            .await
    }

    /// `PATCH <base>/<resource>/<id>/`
    pub async fn update(
        &self,
        id: impl Display + Send,
        payload: Payload,
    ) -> Result<Value, PortalError> {
        let url = self.core.endpoint(&[&self.path, &id.to_string()])?;
        self.core
            .request(Method::Patch, url, Some(payload), false)
            .await
    }

    /// `DELETE <base>/<resource>/<id>/`
    pub async fn delete(&self, id: impl Display + Send) -> Result<(), PortalError> {
        let url = self.core.endpoint(&[&self.path, &id.to_string()])?;
        self.core.request(Method::Delete, url, None, false).await?;
        Ok(())
    }

    /// `POST <base>/<resource>/<id>/<action>/`
    pub async fn perform_action(
        &self,
        id: impl Display + Send,
        action: &str,
        data: Option<Value>,
    ) -> Result<Value, PortalError> {
        let url = self
            .core
            .endpoint(&[&self.path, &id.to_string(), action])?;
        self.core
            .request(Method::Post, url, data.map(Payload::Json), false)
            .await
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::auth::StaticToken;
    use crate::query::Filters;
    use crate::transport::Method;

    use super::testing::FakeTransport;
    use super::*;

    #[tokio::test]
    async fn test_list_builds_url_with_filters_and_bearer() {
        let fake = FakeTransport::new();
        let portal = fake.portal();

        let filters = Filters::new().with("status", "active").with("search", "acme");
        portal.resource("clients").list(&filters).await.unwrap();

        let requests = fake.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Get);
        assert_eq!(
            requests[0].url.as_str(),
            "https://portal.test/admin-portal/v1/clients/?status=active&search=acme"
        );
        assert_eq!(requests[0].bearer.as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_list_without_filters_has_no_query() {
        let fake = FakeTransport::new();
        let portal = fake.portal();

        portal.resource("clients").list(&Filters::new()).await.unwrap();
        assert_eq!(
            fake.requests()[0].url.as_str(),
            "https://portal.test/admin-portal/v1/clients/"
        );
    }

    #[tokio::test]
    async fn test_get_and_action_paths() {
        let fake = FakeTransport::new();
        let portal = fake.portal();

        portal.resource("meetings").get(42u64).await.unwrap();
        portal
            .resource("meetings")
            .perform_action(42u64, "confirm", None)
            .await
            .unwrap();

        let requests = fake.requests();
        assert_eq!(
            requests[0].url.as_str(),
            "https://portal.test/admin-portal/v1/meetings/42/"
        );
        assert_eq!(
            requests[1].url.as_str(),
            "https://portal.test/admin-portal/v1/meetings/42/confirm/"
        );
        assert_eq!(requests[1].method, Method::Post);
    }

    #[tokio::test]
    async fn test_missing_token_sends_no_bearer() {
        let fake = FakeTransport::new();
        let config = PortalConfig {
            base_url: "https://portal.test/admin-portal/v1".to_string(),
            ..PortalConfig::default()
        };
        let portal =
            Portal::with_transport(config, Arc::new(StaticToken::none()), fake.clone()).unwrap();

        portal.resource("content").list(&Filters::new()).await.unwrap();
        assert!(fake.requests()[0].bearer.is_none());
        // Base URL without a trailing slash still joins correctly.
        assert_eq!(
            fake.requests()[0].url.as_str(),
            "https://portal.test/admin-portal/v1/content/"
        );
    }

    #[tokio::test]
    async fn test_error_detail_is_extracted() {
        let fake = FakeTransport::new();
        fake.push_ok(400, json!({ "detail": "duplicate key value" }));
        let portal = fake.portal();

        let error = portal
            .resource("clients")
            .create(Payload::Json(json!({ "name": "Acme" })))
            .await
            .unwrap_err();
        match error {
            PortalError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "duplicate key value");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_message_fallbacks() {
        let fake = FakeTransport::new();
        fake.push_ok(422, json!({ "message": "bad input" }));
        // 500s repeat until attempts run out.
        for _ in 0..3 {
            fake.push_ok(500, json!("gateway blew up"));
        }
        let portal = fake.portal();
        let resource = portal.resource("tickets");

        let first = resource.get(1u64).await.unwrap_err();
        assert!(matches!(
            first,
            PortalError::Api { status: 422, ref message } if message == "bad input"
        ));

        // 500 retries until attempts run out, then surfaces the body.
        let second = resource.get(1u64).await.unwrap_err();
        assert!(matches!(
            second,
            PortalError::Api { status: 500, ref message } if message == "gateway blew up"
        ));
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth_expired() {
        let fake = FakeTransport::new();
        fake.push_ok(401, json!({ "detail": "token expired" }));
        let portal = fake.portal();

        let error = portal.resource("clients").list(&Filters::new()).await.unwrap_err();
        assert!(matches!(error, PortalError::AuthExpired));
    }

    #[tokio::test]
    async fn test_delete_tolerates_empty_body() {
        let fake = FakeTransport::new();
        fake.push_ok(204, serde_json::Value::Null);
        let portal = fake.portal();

        portal.resource("notifications").delete(9u64).await.unwrap();
        assert_eq!(fake.requests()[0].method, Method::Delete);
    }

    #[tokio::test]
    async fn test_reads_retry_transient_failures() {
        let fake = FakeTransport::new();
        fake.push_ok(503, serde_json::Value::Null);
        fake.push_err(PortalError::Network("connection reset".to_string()));
        fake.push_ok(200, json!([]));
        let portal = fake.portal();

        portal.resource("clients").list(&Filters::new()).await.unwrap();
        assert_eq!(fake.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_writes_never_retry() {
        let fake = FakeTransport::new();
        fake.push_ok(503, serde_json::Value::Null);
        let portal = fake.portal();

        let error = portal
            .resource("clients")
            .create(Payload::Json(json!({ "name": "Acme" })))
            .await
            .unwrap_err();
        assert!(matches!(error, PortalError::Api { status: 503, .. }));
        assert_eq!(fake.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_non_retryable_status_fails_fast() {
        let fake = FakeTransport::new();
        fake.push_ok(404, json!({ "detail": "not found" }));
        let portal = fake.portal();

        let error = portal.resource("clients").get(77u64).await.unwrap_err();
        assert!(matches!(error, PortalError::Api { status: 404, .. }));
        assert_eq!(fake.requests().len(), 1);
    }

    #[test]
    fn test_retry_delay_is_capped() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_backoff_ms: 250,
            max_backoff_ms: 2_000,
        };
        assert_eq!(retry_delay(1, &policy), Duration::from_millis(250));
        assert_eq!(retry_delay(2, &policy), Duration::from_millis(500));
        assert_eq!(retry_delay(4, &policy), Duration::from_millis(2_000));
        assert_eq!(retry_delay(10, &policy), Duration::from_millis(2_000));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let config = PortalConfig {
            base_url: "not a url".to_string(),
            ..PortalConfig::default()
        };
        let result = Portal::with_transport(
            config,
            Arc::new(StaticToken::none()),
            FakeTransport::new(),
        );
        assert!(matches!(result, Err(PortalError::InvalidBaseUrl(_))));
    }
}
