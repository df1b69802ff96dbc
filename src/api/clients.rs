//! Client-roster resource.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::envelope::{normalize_list, unwrap_object};
use crate::error::PortalError;
use crate::query::Filters;
use crate::transport::Payload;

use super::ResourceClient;

/// A client organization as the portal lists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewClient {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

/// Partial update; absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClientUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientFilters {
    pub status: Option<String>,
    pub search: Option<String>,
}

impl ClientFilters {
    pub fn to_query(&self) -> Filters {
        Filters::new()
            .with_opt("status", self.status.as_deref())
            .with_opt("search", self.search.as_deref())
    }
}

pub struct ClientsApi {
    resource: ResourceClient,
}

impl ClientsApi {
    pub(super) fn new(resource: ResourceClient) -> Self {
        Self { resource }
    }

    pub async fn list(&self, filters: &ClientFilters) -> Result<Vec<ClientRecord>, PortalError> {
        let body = self.resource.list(&filters.to_query()).await?;
        Ok(normalize_list(&body))
    }

    pub async fn get(&self, id: u64) -> Result<ClientRecord, PortalError> {
        let body = self.resource.get(id).await?;
        Ok(serde_json::from_value(unwrap_object(body))?)
    }

    pub async fn create(&self, client: &NewClient) -> Result<ClientRecord, PortalError> {
        let payload = Payload::Json(serde_json::to_value(client)?);
        let body = self.resource.create(payload).await?;
        Ok(serde_json::from_value(unwrap_object(body))?)
    }

    pub async fn update(&self, id: u64, changes: &ClientUpdate) -> Result<ClientRecord, PortalError> {
        let payload = Payload::Json(serde_json::to_value(changes)?);
        let body = self.resource.update(id, payload).await?;
        Ok(serde_json::from_value(unwrap_object(body))?)
    }

    pub async fn delete(&self, id: u64) -> Result<(), PortalError> {
        self.resource.delete(id).await
    }

    /// Raw list body, for callers that want the envelope untouched.
    pub async fn list_raw(&self, filters: &ClientFilters) -> Result<Value, PortalError> {
        self.resource.list(&filters.to_query()).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::api::testing::FakeTransport;
    use crate::fetch::FetchHandle;
    use crate::mutation::MutationHandle;

    use super::*;

    fn acme_rows() -> Value {
        json!([
            { "id": 1, "name": "Acme Corp", "email": "ops@acme.test", "status": "active" },
            { "id": 2, "name": "Acme Labs", "status": "prospect" },
        ])
    }

    #[tokio::test]
    async fn test_list_normalizes_results_envelope() {
        let fake = FakeTransport::new();
        fake.push_ok(200, json!({ "results": acme_rows(), "count": 2 }));
        let portal = fake.portal();

        let filters = ClientFilters {
            search: Some("acme".to_string()),
            ..ClientFilters::default()
        };
        let clients = portal.clients().list(&filters).await.unwrap();

        assert_eq!(clients.len(), 2);
        assert_eq!(clients[0].name, "Acme Corp");
        assert_eq!(clients[1].email, None);
        assert_eq!(
            fake.requests()[0].url.as_str(),
            "https://portal.test/admin-portal/v1/clients/?search=acme"
        );
    }

    #[tokio::test]
    async fn test_get_unwraps_data_envelope() {
        let fake = FakeTransport::new();
        fake.push_ok(200, json!({ "data": { "id": 7, "name": "Initech" } }));
        let portal = fake.portal();

        let client = portal.clients().get(7).await.unwrap();
        assert_eq!(client.id, 7);
        assert_eq!(client.name, "Initech");
    }

    #[tokio::test]
    async fn test_create_serializes_only_present_fields() {
        let fake = FakeTransport::new();
        fake.push_ok(201, json!({ "id": 3, "name": "Globex" }));
        let portal = fake.portal();

        let new_client = NewClient {
            name: "Globex".to_string(),
            email: Some("hq@globex.test".to_string()),
            ..NewClient::default()
        };
        portal.clients().create(&new_client).await.unwrap();

        let payload = fake.requests()[0].payload.clone().unwrap();
        assert_eq!(
            payload,
            Payload::Json(json!({ "name": "Globex", "email": "hq@globex.test" }))
        );
    }

    #[tokio::test]
    async fn test_fetch_handle_end_to_end() {
        let fake = FakeTransport::new();
        fake.push_ok(200, json!({ "results": acme_rows() }));
        let portal = Arc::new(fake.portal());

        let handle = FetchHandle::from_fn(
            {
                let portal = portal.clone();
                move |filters| {
                    let portal = portal.clone();
                    async move {
                        let body = portal.resource("clients").list(&filters).await?;
                        Ok(normalize_list::<ClientRecord>(&body))
                    }
                }
            },
            Filters::new().with("search", "acme"),
        );

        let state = handle.settled().await;
        let data = state.data.unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].id, 1);
        assert!(state.error.is_none());
        assert!(!state.loading);
        assert_eq!(
            fake.requests()[0].url.as_str(),
            "https://portal.test/admin-portal/v1/clients/?search=acme"
        );
    }

    #[tokio::test]
    async fn test_mutation_handle_translates_duplicate_key() {
        let fake = FakeTransport::new();
        fake.push_ok(400, json!({ "detail": "duplicate key value" }));
        let portal = Arc::new(fake.portal());

        let handle = MutationHandle::from_fn({
            let portal = portal.clone();
            move |client: NewClient| {
                let portal = portal.clone();
                async move { portal.clients().create(&client).await }
            }
        });

        let result = handle
            .mutate(NewClient {
                name: "Acme Corp".to_string(),
                ..NewClient::default()
            })
            .await;
        assert!(result.is_err());

        let error = handle.state().error.unwrap();
        assert_eq!(error, "A record with these details already exists.");
        assert!(!error.contains("duplicate key value"));
    }
}
