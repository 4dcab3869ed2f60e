//! High-level pipeline: orchestrates listing → filtering → mapping → confirmation → transfer.
//!
//! One entrypoint, [`migrate`], drives both strategies selected by
//! [`MigrateConfig::pagination`]:
//!   - [`Pagination::Streaming`]: one provider page at a time. The first non-empty batch is
//!     sampled to the operator and, when interactive, must be confirmed before anything is
//!     transferred. Each batch runs through the worker pool and is reported before the next
//!     page is requested.
//!   - [`Pagination::Eager`]: every type is listed first, the full mapping table is shown,
//!     then each type is migrated as one batch.
//!
//! # Error Handling
//! Configuration and listing errors stop the run and are returned. Per-item fetch/upload
//! failures never stop sibling transfers; they are collected into the [`MigrationReport`].
//! A declined confirmation is not an error: the report comes back with `declined` set.

use std::fmt;

use tracing::{debug, info, warn};

use crate::config::{Confirmation, MigrateConfig, Pagination, SAMPLE_SIZE};
use crate::contract::{Console, Destination, Fetcher, Mapping, ResourceLister, ResourceType};
use crate::error::MigrateError;
use crate::listing::{list_all, BatchStream};
use crate::mapper::map_urls;
use crate::transfer::{transfer_batch, TransferFailure, TransferOutcome, TransferResult};

pub const CONFIRM_PROMPT: &str = "Please check your input data once and confirm [yes]";

/// Tallies for one migrated batch.
#[derive(Debug)]
pub struct BatchReport {
    pub resource_type: ResourceType,
    pub index: usize,
    pub attempted: usize,
    pub uploaded: usize,
    pub skipped: usize,
    pub failures: Vec<TransferFailure>,
}

impl BatchReport {
    pub fn from_results(
        resource_type: ResourceType,
        index: usize,
        results: Vec<TransferResult>,
    ) -> Self {
        let mut report = Self {
            resource_type,
            index,
            attempted: results.len(),
            uploaded: 0,
            skipped: 0,
            failures: Vec::new(),
        };
        for result in results {
            match result {
                Ok(TransferOutcome::Uploaded(_)) => report.uploaded += 1,
                Ok(TransferOutcome::Skipped) => report.skipped += 1,
                Err(failure) => report.failures.push(failure),
            }
        }
        report
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Tallies for one resource type across all of its batches.
#[derive(Debug)]
pub struct TypeReport {
    pub resource_type: ResourceType,
    pub batches: usize,
    pub attempted: usize,
    pub uploaded: usize,
    pub skipped: usize,
    pub failures: Vec<TransferFailure>,
}

impl TypeReport {
    fn new(resource_type: ResourceType) -> Self {
        Self {
            resource_type,
            batches: 0,
            attempted: 0,
            uploaded: 0,
            skipped: 0,
            failures: Vec::new(),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.uploaded + self.skipped
    }
}

/// Outcome of a whole run.
#[derive(Debug, Default)]
pub struct MigrationReport {
    /// The operator declined the mapping; nothing was transferred.
    pub declined: bool,
    pub types: Vec<TypeReport>,
}

impl MigrationReport {
    fn absorb(&mut self, batch: BatchReport) {
        let idx = match self
            .types
            .iter()
            .position(|t| t.resource_type == batch.resource_type)
        {
            Some(idx) => idx,
            None => {
                self.types.push(TypeReport::new(batch.resource_type));
                self.types.len() - 1
            }
        };
        let entry = &mut self.types[idx];
        entry.batches += 1;
        entry.attempted += batch.attempted;
        entry.uploaded += batch.uploaded;
        entry.skipped += batch.skipped;
        entry.failures.extend(batch.failures);
    }

    pub fn attempted(&self) -> usize {
        self.types.iter().map(|t| t.attempted).sum()
    }

    pub fn failed(&self) -> usize {
        self.types.iter().map(|t| t.failures.len()).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &TransferFailure> {
        self.types.iter().flat_map(|t| t.failures.iter())
    }
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.declined {
            return writeln!(f, "Migration declined; nothing was transferred.");
        }
        writeln!(f, "Migration report")?;
        if self.types.is_empty() {
            writeln!(f, "  no resources matched")?;
        }
        for t in &self.types {
            writeln!(
                f,
                "  {}: {} attempted, {} succeeded ({} skipped), {} failed",
                t.resource_type,
                t.attempted,
                t.succeeded(),
                t.skipped,
                t.failures.len()
            )?;
        }
        if self.failed() > 0 {
            writeln!(f, "Following resources failed:")?;
            for failure in self.failures() {
                writeln!(
                    f,
                    "  source URL: {} ({})",
                    failure.mapping.source_url, failure.error
                )?;
            }
        }
        Ok(())
    }
}

/// Apply the folder filter (if any) and map the remaining URLs.
fn map_batch(config: &MigrateConfig, urls: Vec<String>) -> Vec<Mapping> {
    let urls = match &config.folders {
        Some(filter) => filter.apply(urls),
        None => urls,
    };
    map_urls(
        urls,
        config.keep_structure,
        config.target_parent_path.as_deref(),
    )
}

fn display_rows<D>(destination: &D, mappings: &[Mapping]) -> Vec<(String, String)>
where
    D: Destination + ?Sized,
{
    mappings
        .iter()
        .map(|m| (m.source_url.clone(), destination.display_url(&m.target_key)))
        .collect()
}

/// Ask the operator to approve. Auto-proceed always approves.
fn confirm<C>(config: &MigrateConfig, console: &C) -> Result<bool, MigrateError>
where
    C: Console + ?Sized,
{
    if config.confirmation == Confirmation::AutoProceed {
        return Ok(true);
    }
    let answer = console.prompt(CONFIRM_PROMPT)?;
    let approved = answer.trim().eq_ignore_ascii_case("yes");
    if !approved {
        warn!(answer = %answer.trim(), "Operator declined the migration");
    }
    Ok(approved)
}

/// List, filter and map every requested type without transferring anything.
pub async fn plan<L>(
    config: &MigrateConfig,
    lister: &L,
) -> Result<Vec<(ResourceType, Vec<Mapping>)>, MigrateError>
where
    L: ResourceLister + ?Sized,
{
    config.validate()?;
    let listings = list_all(lister, &config.resource_types, config.page_size).await?;
    Ok(listings
        .into_iter()
        .map(|(resource_type, urls)| {
            let mappings = map_batch(config, urls);
            info!(%resource_type, mappings = mappings.len(), "Planned resource type");
            (resource_type, mappings)
        })
        .collect())
}

/// Entrypoint: run a migration according to `config`.
pub async fn migrate<L, F, D, C>(
    config: &MigrateConfig,
    lister: &L,
    fetcher: &F,
    destination: &D,
    console: &C,
) -> Result<MigrationReport, MigrateError>
where
    L: ResourceLister + ?Sized,
    F: Fetcher + ?Sized,
    D: Destination + ?Sized,
    C: Console + ?Sized,
{
    config.validate()?;
    info!(
        pagination = ?config.pagination,
        confirmation = ?config.confirmation,
        workers = config.max_workers,
        "[MIGRATE] Starting migration"
    );

    let report = match config.pagination {
        Pagination::Streaming => {
            migrate_streaming(config, lister, fetcher, destination, console).await?
        }
        Pagination::Eager => migrate_eager(config, lister, fetcher, destination, console).await?,
    };

    info!(
        declined = report.declined,
        attempted = report.attempted(),
        failed = report.failed(),
        "[MIGRATE] Migration finished"
    );
    Ok(report)
}

async fn migrate_streaming<L, F, D, C>(
    config: &MigrateConfig,
    lister: &L,
    fetcher: &F,
    destination: &D,
    console: &C,
) -> Result<MigrationReport, MigrateError>
where
    L: ResourceLister + ?Sized,
    F: Fetcher + ?Sized,
    D: Destination + ?Sized,
    C: Console + ?Sized,
{
    let mut report = MigrationReport::default();
    let mut batches = BatchStream::new(
        lister,
        &config.resource_types,
        config.streaming_page_size(),
    );
    let mut approved = false;

    while let Some(batch) = batches.next_batch().await? {
        let mappings = map_batch(config, batch.urls);
        if mappings.is_empty() {
            debug!(batch = batch.index, resource_type = %batch.resource_type, "No mappings left after filtering");
            continue;
        }

        if !approved {
            let sample = &mappings[..mappings.len().min(SAMPLE_SIZE)];
            console.show_mappings("Sample Mapping", &display_rows(destination, sample));
            if !confirm(config, console)? {
                report.declined = true;
                return Ok(report);
            }
            approved = true;
        }

        info!(
            batch = batch.index,
            resource_type = %batch.resource_type,
            mappings = mappings.len(),
            "[MIGRATE] Migrating batch"
        );
        let results = transfer_batch(
            mappings,
            fetcher,
            destination,
            config.resume,
            config.max_workers,
        )
        .await;
        let batch_report = BatchReport::from_results(batch.resource_type, batch.index, results);
        info!(
            batch = batch_report.index,
            uploaded = batch_report.uploaded,
            skipped = batch_report.skipped,
            failed = batch_report.failed(),
            "[MIGRATE] Batch finished"
        );
        console.batch_finished(&batch_report);
        report.absorb(batch_report);
    }

    Ok(report)
}

async fn migrate_eager<L, F, D, C>(
    config: &MigrateConfig,
    lister: &L,
    fetcher: &F,
    destination: &D,
    console: &C,
) -> Result<MigrationReport, MigrateError>
where
    L: ResourceLister + ?Sized,
    F: Fetcher + ?Sized,
    D: Destination + ?Sized,
    C: Console + ?Sized,
{
    let mut report = MigrationReport::default();
    let planned = plan(config, lister).await?;

    for (resource_type, mappings) in &planned {
        console.show_mappings(
            &format!("{resource_type} mappings"),
            &display_rows(destination, mappings),
        );
    }

    let total: usize = planned.iter().map(|(_, m)| m.len()).sum();
    if total == 0 {
        info!("[MIGRATE] Nothing to migrate");
        return Ok(report);
    }
    if !confirm(config, console)? {
        report.declined = true;
        return Ok(report);
    }

    for (index, (resource_type, mappings)) in planned.into_iter().enumerate() {
        if mappings.is_empty() {
            continue;
        }
        info!(%resource_type, mappings = mappings.len(), "[MIGRATE] Migrating resource type");
        let results = transfer_batch(
            mappings,
            fetcher,
            destination,
            config.resume,
            config.max_workers,
        )
        .await;
        let batch_report = BatchReport::from_results(resource_type, index + 1, results);
        console.batch_finished(&batch_report);
        report.absorb(batch_report);
    }

    Ok(report)
}
