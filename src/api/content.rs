//! Content-management resource.
//!
//! Creation comes in two flavors: plain JSON, and multipart when an
//! attachment rides along. Multipart fields reach the transport unmodified.

use serde::{Deserialize, Serialize};

use crate::envelope::{normalize_list, unwrap_object};
use crate::error::PortalError;
use crate::query::Filters;
use crate::transport::{Part, Payload};

use super::ResourceClient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub published: bool,
    /// URL of the stored attachment, when one was uploaded.
    #[serde(default)]
    pub attachment: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewContent {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

/// An attachment to upload with a content item.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentFilters {
    pub kind: Option<String>,
    pub published: Option<bool>,
    pub search: Option<String>,
}

impl ContentFilters {
    pub fn to_query(&self) -> Filters {
        Filters::new()
            .with_opt("kind", self.kind.as_deref())
            .with_opt_flag("published", self.published)
            .with_opt("search", self.search.as_deref())
    }
}

pub struct ContentApi {
    resource: ResourceClient,
}

impl ContentApi {
    pub(super) fn new(resource: ResourceClient) -> Self {
        Self { resource }
    }

    pub async fn list(&self, filters: &ContentFilters) -> Result<Vec<ContentItem>, PortalError> {
        let body = self.resource.list(&filters.to_query()).await?;
        Ok(normalize_list(&body))
    }

    pub async fn get(&self, id: u64) -> Result<ContentItem, PortalError> {
        let body = self.resource.get(id).await?;
        Ok(serde_json::from_value(unwrap_object(body))?)
    }

    pub async fn create(&self, content: &NewContent) -> Result<ContentItem, PortalError> {
        let payload = Payload::Json(serde_json::to_value(content)?);
        let body = self.resource.create(payload).await?;
        Ok(serde_json::from_value(unwrap_object(body))?)
    }

    /// Create a content item with a file attachment (multipart).
    pub async fn create_with_attachment(
        &self,
        content: &NewContent,
        attachment: Attachment,
    ) -> Result<ContentItem, PortalError> {
        let mut parts = vec![Part::Text {
            name: "title".to_string(),
            value: content.title.clone(),
        }];
        if let Some(kind) = &content.kind {
            parts.push(Part::Text {
                name: "kind".to_string(),
                value: kind.clone(),
            });
        }
        if let Some(body) = &content.body {
            parts.push(Part::Text {
                name: "body".to_string(),
                value: body.clone(),
            });
        }
        if let Some(published) = content.published {
            parts.push(Part::Text {
                name: "published".to_string(),
                value: if published { "true" } else { "false" }.to_string(),
            });
        }
        parts.push(Part::File {
            name: "attachment".to_string(),
            file_name: attachment.file_name,
            content_type: attachment.content_type,
            bytes: attachment.bytes,
        });

        let body = self.resource.create(Payload::Multipart(parts)).await?;
        Ok(serde_json::from_value(unwrap_object(body))?)
    }

    pub async fn delete(&self, id: u64) -> Result<(), PortalError> {
        self.resource.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::api::testing::FakeTransport;

    use super::*;

    #[tokio::test]
    async fn test_multipart_create_passes_fields_through() {
        let fake = FakeTransport::new();
        fake.push_ok(201, json!({ "id": 5, "title": "Onboarding deck", "published": false }));
        let portal = fake.portal();

        let content = NewContent {
            title: "Onboarding deck".to_string(),
            kind: Some("deck".to_string()),
            ..NewContent::default()
        };
        let attachment = Attachment {
            file_name: "deck.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            bytes: vec![0x25, 0x50, 0x44, 0x46],
        };
        portal
            .content()
            .create_with_attachment(&content, attachment)
            .await
            .unwrap();

        let request = &fake.requests()[0];
        let Some(Payload::Multipart(parts)) = &request.payload else {
            panic!("expected multipart payload, got {:?}", request.payload);
        };
        assert_eq!(
            parts[0],
            Part::Text {
                name: "title".to_string(),
                value: "Onboarding deck".to_string()
            }
        );
        assert!(parts.iter().any(|part| matches!(
            part,
            Part::File { name, file_name, bytes, .. }
                if name == "attachment" && file_name == "deck.pdf" && bytes == &[0x25, 0x50, 0x44, 0x46]
        )));
    }

    #[tokio::test]
    async fn test_json_create_skips_absent_fields() {
        let fake = FakeTransport::new();
        fake.push_ok(201, json!({ "id": 6, "title": "Release notes" }));
        let portal = fake.portal();

        let content = NewContent {
            title: "Release notes".to_string(),
            published: Some(true),
            ..NewContent::default()
        };
        portal.content().create(&content).await.unwrap();

        assert_eq!(
            fake.requests()[0].payload,
            Some(Payload::Json(
                json!({ "title": "Release notes", "published": true })
            ))
        );
    }
}
