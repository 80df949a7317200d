//! Executes `HttpRequest` values against the remote host.
//!
//! # Design
//! `Transport` is the only I/O seam in the crate. `MalClient` is generic over
//! it so tests can substitute a recording or failing double. The transport
//! reports any completed exchange as an `HttpResponse`, whatever its status;
//! status interpretation happens in the client.
//!
//! No timeout is configured here; requests wait as long as the underlying
//! HTTP stack allows.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::error::{MalError, NetworkError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// `Transport` backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| MalError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;
        debug!(%method, %url, "sending request");

        let method = match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self.client.request(method, &url).headers(header_map(&headers)?);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(NetworkError::from)?;
        debug!(status, bytes = body.len(), "received response");

        Ok(HttpResponse { status, body })
    }
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| MalError::InvalidArgument(format!("bad header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| MalError::InvalidArgument(format!("bad header value for {name}: {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}
