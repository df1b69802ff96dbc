//! HTTP transport seam.
//!
//! `Transport` is the only place network I/O happens; everything above it
//! (resource clients, fetch/mutation handles) runs against fakes in tests.
//! The production implementation is reqwest.

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::error::PortalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// One multipart form field.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

/// Request body. JSON is serialized by the transport; multipart fields are
/// passed to the wire unmodified (file-upload flows depend on this).
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Multipart(Vec<Part>),
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub bearer: Option<String>,
    pub payload: Option<Payload>,
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed body. `Null` for empty bodies; non-JSON text is carried as a
    /// JSON string so error messages survive.
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, PortalError>;
}

/// Production transport over a shared reqwest client.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, PortalError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(request.url.clone()),
            Method::Post => self.client.post(request.url.clone()),
            Method::Patch => self.client.patch(request.url.clone()),
            Method::Delete => self.client.delete(request.url.clone()),
        };

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        match request.payload {
            Some(Payload::Json(body)) => builder = builder.json(&body),
            Some(Payload::Multipart(parts)) => builder = builder.multipart(multipart_form(parts)?),
            None => {}
        }

        let response = builder
            .send()
            .await
            .map_err(|error| PortalError::Network(error.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|error| PortalError::Network(error.to_string()))?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(ApiResponse { status, body })
    }
}

fn multipart_form(parts: Vec<Part>) -> Result<reqwest::multipart::Form, PortalError> {
    let mut form = reqwest::multipart::Form::new();
    for part in parts {
        form = match part {
            Part::Text { name, value } => form.text(name, value),
            Part::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                let mut file = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
                if let Some(mime) = content_type {
                    file = file.mime_str(&mime).map_err(|error| {
                        PortalError::InvalidRequest(format!("bad content type: {error}"))
                    })?;
                }
                form.part(name, file)
            }
        };
    }
    Ok(form)
}
