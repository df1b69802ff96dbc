//! Notification feed resource.

use serde::{Deserialize, Serialize};

use crate::envelope::{normalize_list, unwrap_object};
use crate::error::PortalError;
use crate::query::Filters;

use super::ResourceClient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationFilters {
    pub unread: Option<bool>,
}

impl NotificationFilters {
    pub fn to_query(&self) -> Filters {
        Filters::new().with_opt_flag("unread", self.unread)
    }
}

pub struct NotificationsApi {
    resource: ResourceClient,
}

impl NotificationsApi {
    pub(super) fn new(resource: ResourceClient) -> Self {
        Self { resource }
    }

    pub async fn list(
        &self,
        filters: &NotificationFilters,
    ) -> Result<Vec<Notification>, PortalError> {
        let body = self.resource.list(&filters.to_query()).await?;
        Ok(normalize_list(&body))
    }

    pub async fn mark_read(&self, id: u64) -> Result<Notification, PortalError> {
        let body = self.resource.perform_action(id, "mark-read", None).await?;
        Ok(serde_json::from_value(unwrap_object(body))?)
    }

    pub async fn delete(&self, id: u64) -> Result<(), PortalError> {
        self.resource.delete(id).await
    }
}
