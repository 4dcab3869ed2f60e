//! HTTP clients for the source side of a migration.
//!
//! - [`CloudinaryClient`] lists resources through the provider's Admin API.
//! - [`HttpFetcher`] downloads resource content over one shared, connection-pooling client.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::contract::{Fetcher, ResourceLister, ResourcePage, ResourceType};
use crate::error::{FetchError, ListingError, MigrateError};

pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Account credentials for the media library.
#[derive(Clone)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl std::fmt::Debug for CloudinaryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryCredentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ResourcesResponse {
    #[serde(default)]
    resources: Vec<ResourceDescriptor>,
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResourceDescriptor {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Admin-API client listing resources page by page.
pub struct CloudinaryClient {
    client: Client,
    api_base: String,
    credentials: CloudinaryCredentials,
}

impl CloudinaryClient {
    pub fn new(
        client: Client,
        api_base: impl Into<String>,
        credentials: CloudinaryCredentials,
    ) -> Result<Self, MigrateError> {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        if credentials.cloud_name.trim().is_empty()
            || credentials.api_key.trim().is_empty()
            || credentials.api_secret.trim().is_empty()
        {
            error!(cloud_name = %credentials.cloud_name, "Incomplete media library credentials");
            return Err(MigrateError::Configuration(
                "cloud name, API key and API secret are all required".to_string(),
            ));
        }
        info!(
            api_base = %api_base,
            cloud_name = %credentials.cloud_name,
            "Initialised media library client"
        );
        Ok(Self {
            client,
            api_base,
            credentials,
        })
    }

    fn resources_url(&self, resource_type: ResourceType) -> String {
        format!(
            "{}/{}/resources/{}",
            self.api_base, self.credentials.cloud_name, resource_type
        )
    }
}

#[async_trait]
impl ResourceLister for CloudinaryClient {
    async fn list_page(
        &self,
        resource_type: ResourceType,
        max_results: Option<u32>,
        cursor: Option<String>,
    ) -> Result<ResourcePage, ListingError> {
        let url = self.resources_url(resource_type);
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(max) = max_results {
            query.push(("max_results", max.to_string()));
        }
        if let Some(cursor) = cursor {
            query.push(("next_cursor", cursor));
        }

        let resp = self
            .client
            .get(&url)
            .basic_auth(&self.credentials.api_key, Some(&self.credentials.api_secret))
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, url = %url, "Resource listing request failed");
                ListingError::Request(e.to_string())
            })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ListingError::Decode(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);
            error!(status = %status, url = %url, message = %message, "Listing API returned error");
            return Err(ListingError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: ResourcesResponse =
            serde_json::from_str(&text).map_err(|e| ListingError::Decode(e.to_string()))?;
        debug!(
            %resource_type,
            resources = body.resources.len(),
            next_cursor = ?body.next_cursor,
            "Listed resource page"
        );
        Ok(ResourcePage {
            urls: body.resources.into_iter().map(|r| r.url).collect(),
            next_cursor: body.next_cursor,
        })
    }
}

/// Downloads resource bytes. Cloning shares the underlying connection pool.
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let resp = self.client.get(url).send().await.map_err(|e| {
            error!(error = ?e, url = %url, "Download request failed");
            FetchError::Request(e.to_string())
        })?;

        let status = resp.status();
        if !status.is_success() {
            error!(status = %status, url = %url, "Download returned error status");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;
        debug!(url = %url, size_bytes = body.len(), "Downloaded resource");
        Ok(body)
    }
}
