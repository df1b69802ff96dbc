//! Support-ticket resource.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::envelope::{normalize_list, unwrap_object};
use crate::error::PortalError;
use crate::query::Filters;
use crate::transport::Payload;

use super::ResourceClient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: u64,
    pub subject: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub escalated: bool,
    #[serde(default)]
    pub client: Option<u64>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// A message on a ticket thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketMessage {
    pub id: u64,
    #[serde(default)]
    pub ticket: Option<u64>,
    #[serde(default)]
    pub author: Option<String>,
    pub body: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewTicket {
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TicketUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalated: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketFilters {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub escalated: Option<bool>,
    pub search: Option<String>,
}

impl TicketFilters {
    pub fn to_query(&self) -> Filters {
        Filters::new()
            .with_opt("status", self.status.as_deref())
            .with_opt("priority", self.priority.as_deref())
            .with_opt_flag("escalated", self.escalated)
            .with_opt("search", self.search.as_deref())
    }
}

pub struct TicketsApi {
    resource: ResourceClient,
}

impl TicketsApi {
    pub(super) fn new(resource: ResourceClient) -> Self {
        Self { resource }
    }

    pub async fn list(&self, filters: &TicketFilters) -> Result<Vec<Ticket>, PortalError> {
        let body = self.resource.list(&filters.to_query()).await?;
        Ok(normalize_list(&body))
    }

    pub async fn get(&self, id: u64) -> Result<Ticket, PortalError> {
        let body = self.resource.get(id).await?;
        Ok(serde_json::from_value(unwrap_object(body))?)
    }

    pub async fn create(&self, ticket: &NewTicket) -> Result<Ticket, PortalError> {
        let payload = Payload::Json(serde_json::to_value(ticket)?);
        let body = self.resource.create(payload).await?;
        Ok(serde_json::from_value(unwrap_object(body))?)
    }

    pub async fn update(&self, id: u64, changes: &TicketUpdate) -> Result<Ticket, PortalError> {
        let payload = Payload::Json(serde_json::to_value(changes)?);
        let body = self.resource.update(id, payload).await?;
        Ok(serde_json::from_value(unwrap_object(body))?)
    }

    pub async fn delete(&self, id: u64) -> Result<(), PortalError> {
        self.resource.delete(id).await
    }

    /// Append a message to the ticket thread.
    pub async fn add_message(&self, id: u64, body: &str) -> Result<TicketMessage, PortalError> {
        let response = self
            .resource
            .perform_action(id, "add-message", Some(json!({ "body": body })))
            .await?;
        Ok(serde_json::from_value(unwrap_object(response))?)
    }
}
