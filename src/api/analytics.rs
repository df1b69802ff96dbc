//! Dashboard analytics.
//!
//! A single read endpoint; every field defaults so a partial rollout on
//! the backend can't break the overview page.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::envelope::unwrap_object;
use crate::error::PortalError;
use crate::transport::Method;

use super::PortalCore;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsOverview {
    #[serde(default)]
    pub total_clients: u64,
    #[serde(default)]
    pub active_clients: u64,
    #[serde(default)]
    pub open_tickets: u64,
    #[serde(default)]
    pub escalated_tickets: u64,
    #[serde(default)]
    pub upcoming_meetings: u64,
    #[serde(default)]
    pub unread_notifications: u64,
    /// Decimal revenue as the backend serializes it.
    #[serde(default)]
    pub revenue_this_month: Option<String>,
}

pub struct AnalyticsApi {
    core: Arc<PortalCore>,
}

impl AnalyticsApi {
    pub(super) fn new(core: Arc<PortalCore>) -> Self {
        Self { core }
    }

    /// `GET <base>/analytics/overview/`
    pub async fn overview(&self) -> Result<AnalyticsOverview, PortalError> {
        let url = self.core.endpoint(&["analytics", "overview"])?;
        let body = self.core.request(Method::Get, url, None, true).await?;
        Ok(serde_json::from_value(unwrap_object(body))?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::api::testing::FakeTransport;

    use super::*;

    #[tokio::test]
    async fn test_overview_path_and_partial_body() {
        let fake = FakeTransport::new();
        fake.push_ok(
            200,
            json!({ "data": { "total_clients": 42, "open_tickets": 3 } }),
        );
        let portal = fake.portal();

        let overview = portal.analytics().overview().await.unwrap();
        assert_eq!(overview.total_clients, 42);
        assert_eq!(overview.open_tickets, 3);
        assert_eq!(overview.escalated_tickets, 0);
        assert!(overview.revenue_this_month.is_none());

        assert_eq!(
            fake.requests()[0].url.as_str(),
            "https://portal.test/admin-portal/v1/analytics/overview/"
        );
    }
}
