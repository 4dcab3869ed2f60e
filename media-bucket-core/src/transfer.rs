//! Transfer of single mappings and of whole batches through a bounded pool.

use futures::stream::{self, StreamExt};
use tracing::{debug, error, warn};

use crate::contract::{Destination, Fetcher, Mapping, PutReceipt};
use crate::error::TransferError;

/// A successful transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Uploaded(PutReceipt),
    /// The target already existed and `resume` was on.
    Skipped,
}

/// A failed transfer, keyed back to the mapping that failed.
#[derive(Debug)]
pub struct TransferFailure {
    pub mapping: Mapping,
    pub error: TransferError,
}

pub type TransferResult = Result<TransferOutcome, TransferFailure>;

/// Copy one resource to the destination. Errors are returned, never retried.
pub async fn transfer<F, D>(
    mapping: Mapping,
    fetcher: &F,
    destination: &D,
    resume: bool,
) -> TransferResult
where
    F: Fetcher + ?Sized,
    D: Destination + ?Sized,
{
    if resume {
        match destination.exists(&mapping.target_key).await {
            Ok(true) => {
                debug!(key = %mapping.target_key, "Target already migrated, skipping");
                return Ok(TransferOutcome::Skipped);
            }
            Ok(false) => {}
            Err(e) => {
                warn!(key = %mapping.target_key, error = %e, "Existence probe failed, migrating anyway");
            }
        }
    }

    let body = match fetcher.fetch(&mapping.source_url).await {
        Ok(body) => body,
        Err(e) => {
            error!(source_url = %mapping.source_url, error = %e, "Fetch failed");
            return Err(TransferFailure {
                mapping,
                error: e.into(),
            });
        }
    };

    let size_bytes = body.len();
    match destination.put(&mapping.target_key, body).await {
        Ok(receipt) => {
            debug!(
                source_url = %mapping.source_url,
                key = %mapping.target_key,
                size_bytes,
                e_tag = ?receipt.e_tag,
                "Transferred resource"
            );
            Ok(TransferOutcome::Uploaded(receipt))
        }
        Err(e) => {
            error!(key = %mapping.target_key, error = %e, "Upload failed");
            Err(TransferFailure {
                mapping,
                error: e.into(),
            })
        }
    }
}

/// Transfer every mapping with at most `workers` in flight and wait for all of them.
///
/// Results come back in completion order, one per mapping.
pub async fn transfer_batch<F, D>(
    mappings: Vec<Mapping>,
    fetcher: &F,
    destination: &D,
    resume: bool,
    workers: usize,
) -> Vec<TransferResult>
where
    F: Fetcher + ?Sized,
    D: Destination + ?Sized,
{
    stream::iter(mappings)
        .map(|mapping| transfer(mapping, fetcher, destination, resume))
        .buffer_unordered(workers.max(1))
        .collect()
        .await
}
