//! Billing resource.
//!
//! Read-only from the portal's side: invoices are issued by backend
//! billing runs, the dashboard only lists and inspects them.

use serde::{Deserialize, Serialize};

use crate::envelope::{normalize_list, unwrap_object};
use crate::error::PortalError;
use crate::query::Filters;

use super::ResourceClient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: u64,
    #[serde(default)]
    pub client: Option<u64>,
    #[serde(default)]
    pub client_name: Option<String>,
    /// Decimal amount as the backend serializes it, e.g. `"1200.00"`.
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub issued_at: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillingFilters {
    pub status: Option<String>,
    pub client: Option<u64>,
}

impl BillingFilters {
    pub fn to_query(&self) -> Filters {
        Filters::new()
            .with_opt("status", self.status.as_deref())
            .with_opt("client", self.client)
    }
}

pub struct BillingApi {
    resource: ResourceClient,
}

impl BillingApi {
    pub(super) fn new(resource: ResourceClient) -> Self {
        Self { resource }
    }

    pub async fn list(&self, filters: &BillingFilters) -> Result<Vec<Invoice>, PortalError> {
        let body = self.resource.list(&filters.to_query()).await?;
        Ok(normalize_list(&body))
    }

    pub async fn get(&self, id: u64) -> Result<Invoice, PortalError> {
        let body = self.resource.get(id).await?;
        Ok(serde_json::from_value(unwrap_object(body))?)
    }
}
