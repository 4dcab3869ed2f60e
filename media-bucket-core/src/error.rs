//! Error taxonomy for the migration pipeline.
//!
//! Only [`MigrateError`] stops a run. [`FetchError`] and [`UploadError`] are per-item:
//! the transfer step downgrades them into a [`crate::transfer::TransferFailure`] and the
//! run carries on with the next mapping.

use thiserror::Error;

use crate::contract::ResourceType;

/// Failure of the provider listing API.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("listing request failed: {0}")]
    Request(String),

    #[error("listing API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("listing response could not be decoded: {0}")]
    Decode(String),
}

/// Failure to download one resource from the source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("download request failed: {0}")]
    Request(String),

    #[error("download returned HTTP {0}")]
    Status(u16),
}

/// Failure to write one object to the destination.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload failed: {0}")]
    Put(String),

    #[error("existence probe failed: {0}")]
    Probe(String),
}

/// Per-item transfer error.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// Errors that halt a migration run.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("listing {resource_type} resources failed: {source}")]
    Listing {
        resource_type: ResourceType,
        #[source]
        source: ListingError,
    },

    #[error("could not read operator input: {0}")]
    Prompt(String),
}
