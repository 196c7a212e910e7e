//! Thin call sites for the remote demo API.
//!
//! Every call returns the parsed JSON payload untouched. Turning payloads
//! into records happens in [`ingest`], right at this boundary, so nothing
//! loosely shaped flows further in.

pub mod ingest;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::resources::Resource;

pub use ingest::{assigned_id, Page};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Could not reach the remote API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Remote API answered {status} for {resource}")]
    Status { resource: Resource, status: u16 },

    #[error("Unexpected {resource} payload: {reason}")]
    Payload { resource: Resource, reason: String },

    #[error("Invalid API base URL: {0}")]
    InvalidBase(String),
}

impl GatewayError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::Status { status: 404, .. })
    }
}

/// Limit/skip paging for list calls. A limit of zero asks for everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Paging {
    pub limit: u32,
    pub skip: u32,
}

impl Paging {
    pub fn first(limit: u32) -> Self {
        Self { limit, skip: 0 }
    }
}

#[async_trait]
pub trait RemoteGateway: Send + Sync {
    async fn list(&self, resource: Resource, paging: Paging) -> Result<Value, GatewayError>;

    async fn fetch(&self, resource: Resource, id: u64) -> Result<Value, GatewayError>;

    async fn add(&self, resource: Resource, body: Value) -> Result<Value, GatewayError>;

    /// Partial update; only the fields in `body` are sent.
    async fn update(&self, resource: Resource, id: u64, body: Value)
        -> Result<Value, GatewayError>;

    async fn delete(&self, resource: Resource, id: u64) -> Result<Value, GatewayError>;
}

/// reqwest-backed gateway for dummyjson.com and compatible services.
pub struct DummyJsonGateway {
    client: Client,
    base_url: Url,
}

impl DummyJsonGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let base_url =
            Url::parse(base_url).map_err(|e| GatewayError::InvalidBase(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidBase(base_url.to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dummydash/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, resource: Resource, request: RequestBuilder) -> Result<Value, GatewayError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                resource,
                status: status.as_u16(),
            });
        }
        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl RemoteGateway for DummyJsonGateway {
    async fn list(&self, resource: Resource, paging: Paging) -> Result<Value, GatewayError> {
        let mut url = self.endpoint(&[resource.path()]);
        url.query_pairs_mut()
            .append_pair("limit", &paging.limit.to_string())
            .append_pair("skip", &paging.skip.to_string());

        tracing::info!(%resource, limit = paging.limit, skip = paging.skip, "Fetching list");
        self.send(resource, self.client.get(url)).await
    }

    async fn fetch(&self, resource: Resource, id: u64) -> Result<Value, GatewayError> {
        let url = self.endpoint(&[resource.path(), &id.to_string()]);
        self.send(resource, self.client.get(url)).await
    }

    async fn add(&self, resource: Resource, body: Value) -> Result<Value, GatewayError> {
        let url = self.endpoint(&[resource.path(), "add"]);
        self.send(resource, self.client.post(url).json(&body)).await
    }

    async fn update(
        &self,
        resource: Resource,
        id: u64,
        body: Value,
    ) -> Result<Value, GatewayError> {
        let url = self.endpoint(&[resource.path(), &id.to_string()]);
        self.send(resource, self.client.put(url).json(&body)).await
    }

    async fn delete(&self, resource: Resource, id: u64) -> Result<Value, GatewayError> {
        let url = self.endpoint(&[resource.path(), &id.to_string()]);
        self.send(resource, self.client.delete(url)).await
    }
}
