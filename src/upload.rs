#![doc = "S3-compatible destination: bridges the core `Destination` trait to an object-storage bucket."]
//
//! # Bucket destination
//!
//! [`BucketStore`] implements [`media_bucket_core::contract::Destination`] on top of
//! `object_store`'s Amazon S3 client, so any S3-compatible endpoint (AWS, MinIO, R2,
//! DigitalOcean Spaces, ...) can receive the migrated resources.
//!
//! - Existence probes are `HEAD` requests; a missing object is `Ok(false)`.
//! - Writes are single `PUT`s of the whole body.
//! - Target URLs shown to the operator are path-style: `{endpoint}/{bucket}/{key}`.

use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use media_bucket_core::contract::{Destination, PutReceipt};
use media_bucket_core::error::{MigrateError, UploadError};
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload};

pub const DEFAULT_REGION: &str = "us-east-1";

/// Connection settings for the destination bucket.
#[derive(Clone)]
pub struct S3Settings {
    pub endpoint_url: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub region: String,
}

impl std::fmt::Debug for S3Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Settings")
            .field("endpoint_url", &self.endpoint_url)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .finish()
    }
}

pub struct BucketStore {
    store: AmazonS3,
    bucket: String,
    endpoint_url: String,
}

impl BucketStore {
    pub fn new(settings: &S3Settings) -> Result<Self, MigrateError> {
        if settings.bucket.trim().is_empty() {
            return Err(MigrateError::Configuration(
                "S3 bucket name is required".to_string(),
            ));
        }
        let endpoint_url = settings.endpoint_url.trim_end_matches('/').to_string();
        let allow_http = endpoint_url.starts_with("http://");

        let store = AmazonS3Builder::new()
            .with_endpoint(endpoint_url.clone())
            .with_allow_http(allow_http)
            .with_access_key_id(settings.access_key_id.clone())
            .with_secret_access_key(settings.secret_access_key.clone())
            .with_bucket_name(settings.bucket.clone())
            .with_region(settings.region.clone())
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, endpoint = %endpoint_url, bucket = %settings.bucket, "Failed to build S3 client");
                MigrateError::Configuration(format!("could not create S3 client: {e}"))
            })?;

        tracing::info!(
            endpoint = %endpoint_url,
            bucket = %settings.bucket,
            region = %settings.region,
            "Initialised bucket destination"
        );

        Ok(Self {
            store,
            bucket: settings.bucket.clone(),
            endpoint_url,
        })
    }
}

/// Object location for `key`, taken verbatim apart from empty segments, which object
/// paths cannot hold (`https://host/a` becomes `https:/host/a`).
///
/// `Path::from` would escape `%`, turning keys that carry percent-escapes from delivery
/// URLs (`caf%C3%A9.jpg`) into different object names.
fn object_path(key: &str) -> Result<Path, object_store::path::Error> {
    let segments: Vec<&str> = key.split('/').filter(|s| !s.is_empty()).collect();
    Path::parse(segments.join("/"))
}

#[async_trait]
impl Destination for BucketStore {
    async fn exists(&self, key: &str) -> Result<bool, UploadError> {
        let location = object_path(key).map_err(|e| UploadError::Probe(e.to_string()))?;
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => {
                tracing::warn!(error = %e, bucket = %self.bucket, key = %key, "S3 head failed");
                Err(UploadError::Probe(e.to_string()))
            }
        }
    }

    async fn put(&self, key: &str, body: Bytes) -> Result<PutReceipt, UploadError> {
        let size = body.len() as u64;
        let location = object_path(key).map_err(|e| {
            tracing::error!(error = %e, bucket = %self.bucket, key = %key, "Target key is not a valid object path");
            UploadError::Put(e.to_string())
        })?;
        let start = Instant::now();

        let result = self
            .store
            .put(&location, PutPayload::from(body))
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                UploadError::Put(e.to_string())
            })?;

        tracing::debug!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(PutReceipt {
            e_tag: result.e_tag,
            version: result.version,
        })
    }

    fn display_url(&self, key: &str) -> String {
        match object_path(key) {
            Ok(location) => format!("{}/{}/{}", self.endpoint_url, self.bucket, location),
            Err(_) => format!("{}/{}/{}", self.endpoint_url, self.bucket, key),
        }
    }
}
