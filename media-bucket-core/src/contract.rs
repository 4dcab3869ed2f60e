//! # contract: collaborator seams of the migration pipeline
//!
//! The pipeline talks to four collaborators, each behind a trait so that real clients
//! and `mockall` mocks are interchangeable:
//!
//! - [`ResourceLister`]: paginated enumeration of the media library.
//! - [`Fetcher`]: downloads the bytes behind a resource URL.
//! - [`Destination`]: the object-storage bucket (existence probe and write).
//! - [`Console`]: the operator (mapping tables, confirmation, batch reports).
//!
//! Mocks are generated for tests and, with the default `test-export-mocks` feature,
//! exported for downstream crates' integration tests.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use bytes::Bytes;
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::{FetchError, ListingError, MigrateError, UploadError};
use crate::migrate::BatchReport;

/// Kind of media-library resource. The provider lists each kind separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Image,
    Video,
    Raw,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Image => "image",
            ResourceType::Video => "video",
            ResourceType::Raw => "raw",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(ResourceType::Image),
            "video" => Ok(ResourceType::Video),
            "raw" => Ok(ResourceType::Raw),
            other => Err(MigrateError::Configuration(format!(
                "unknown resource type '{other}' (expected image, video or raw)"
            ))),
        }
    }
}

/// One page of the provider listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourcePage {
    /// Resource URLs on this page, in provider order.
    pub urls: Vec<String>,
    /// Continuation token; `None` when this was the last page.
    pub next_cursor: Option<String>,
}

/// A source URL and the bucket key it is copied to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mapping {
    pub source_url: String,
    pub target_key: String,
}

/// What the destination returned for a successful write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutReceipt {
    pub e_tag: Option<String>,
    pub version: Option<String>,
}

/// Paginated listing of the media library.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ResourceLister: Send + Sync {
    /// Fetch one page of resources of `resource_type`.
    ///
    /// `max_results` of `None` uses the provider default. `cursor` is the
    /// `next_cursor` of the previous page, or `None` for the first page.
    async fn list_page(
        &self,
        resource_type: ResourceType,
        max_results: Option<u32>,
        cursor: Option<String>,
    ) -> Result<ResourcePage, ListingError>;
}

/// Downloads resource content. Implementations share one connection pool.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}

/// Object-storage bucket that receives the migrated resources.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Destination: Send + Sync {
    /// Whether an object already exists under `key`.
    async fn exists(&self, key: &str) -> Result<bool, UploadError>;

    /// Write `body` under `key`, replacing any existing object.
    async fn put(&self, key: &str, body: Bytes) -> Result<PutReceipt, UploadError>;

    /// Human-readable location of `key`, used when showing mappings to the operator.
    fn display_url(&self, key: &str) -> String;
}

/// The operator running the migration.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait Console: Send + Sync {
    /// Show a table of `(source, target)` rows under `title`.
    fn show_mappings(&self, title: &str, rows: &[(String, String)]);

    /// Ask a question and return the raw answer.
    fn prompt(&self, message: &str) -> Result<String, MigrateError>;

    /// Called once per finished batch with its tallies and failures.
    fn batch_finished(&self, report: &BatchReport);
}
