//! Meeting scheduling resource.
//!
//! Besides CRUD, meetings expose the named lifecycle actions the dashboard
//! quick-buttons use: confirm, decline, reschedule, complete, cancel.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::envelope::{normalize_list, unwrap_object};
use crate::error::PortalError;
use crate::query::Filters;
use crate::transport::Payload;

use super::ResourceClient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub client: Option<u64>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub scheduled_for: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewMeeting {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial update for meeting details. Lifecycle transitions go through
/// the named actions, not through status edits.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MeetingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeetingFilters {
    pub upcoming: Option<bool>,
    pub status: Option<String>,
    /// Inclusive date bounds on `scheduled_for`.
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub search: Option<String>,
}

impl MeetingFilters {
    pub fn to_query(&self) -> Filters {
        Filters::new()
            .with_opt_flag("upcoming", self.upcoming)
            .with_opt("status", self.status.as_deref())
            .with_opt("scheduled_after", self.from)
            .with_opt("scheduled_before", self.to)
            .with_opt("search", self.search.as_deref())
    }
}

pub struct MeetingsApi {
    resource: ResourceClient,
}

impl MeetingsApi {
    pub(super) fn new(resource: ResourceClient) -> Self {
        Self { resource }
    }

    pub async fn list(&self, filters: &MeetingFilters) -> Result<Vec<Meeting>, PortalError> {
        let body = self.resource.list(&filters.to_query()).await?;
        Ok(normalize_list(&body))
    }

    pub async fn get(&self, id: u64) -> Result<Meeting, PortalError> {
        let body = self.resource.get(id).await?;
        Ok(serde_json::from_value(unwrap_object(body))?)
    }

    pub async fn create(&self, meeting: &NewMeeting) -> Result<Meeting, PortalError> {
        let payload = Payload::Json(serde_json::to_value(meeting)?);
        let body = self.resource.create(payload).await?;
        Ok(serde_json::from_value(unwrap_object(body))?)
    }

    pub async fn update(&self, id: u64, changes: &MeetingUpdate) -> Result<Meeting, PortalError> {
        let payload = Payload::Json(serde_json::to_value(changes)?);
        let body = self.resource.update(id, payload).await?;
        Ok(serde_json::from_value(unwrap_object(body))?)
    }

    pub async fn delete(&self, id: u64) -> Result<(), PortalError> {
        self.resource.delete(id).await
    }

    pub async fn confirm(&self, id: u64) -> Result<Meeting, PortalError> {
        self.lifecycle(id, "confirm", None).await
    }

    pub async fn decline(&self, id: u64, reason: Option<&str>) -> Result<Meeting, PortalError> {
        let data = reason.map(|reason| json!({ "reason": reason }));
        self.lifecycle(id, "decline", data).await
    }

    /// Move a meeting; `scheduled_for` is an RFC 3339 stamp.
    pub async fn reschedule(&self, id: u64, scheduled_for: &str) -> Result<Meeting, PortalError> {
        self.lifecycle(id, "reschedule", Some(json!({ "scheduled_for": scheduled_for })))
            .await
    }

    pub async fn complete(&self, id: u64) -> Result<Meeting, PortalError> {
        self.lifecycle(id, "complete", None).await
    }

    pub async fn cancel(&self, id: u64, reason: Option<&str>) -> Result<Meeting, PortalError> {
        let data = reason.map(|reason| json!({ "reason": reason }));
        self.lifecycle(id, "cancel", data).await
    }

    async fn lifecycle(
        &self,
        id: u64,
        action: &str,
        data: Option<serde_json::Value>,
    ) -> Result<Meeting, PortalError> {
        let body = self.resource.perform_action(id, action, data).await?;
        Ok(serde_json::from_value(unwrap_object(body))?)
    }
}
