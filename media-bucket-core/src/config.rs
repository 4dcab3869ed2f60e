use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::contract::ResourceType;
use crate::error::MigrateError;
use crate::filter::FolderFilter;

pub const DEFAULT_RESOURCE_TYPES: &str = "image,raw,video";
pub const DEFAULT_MAX_WORKERS: usize = 25;
pub const DEFAULT_PAGE_SIZE: u32 = 500;
pub const SAMPLE_SIZE: usize = 5;

/// How resources are pulled from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pagination {
    /// One page at a time; the next page is requested after the batch is migrated.
    #[default]
    Streaming,
    /// Everything is listed up front, then migrated type by type.
    Eager,
}

/// Whether the operator must approve the mapping before any transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Confirmation {
    #[default]
    Interactive,
    AutoProceed,
}

/// Settings for a migration run.
#[derive(Debug, Clone)]
pub struct MigrateConfig {
    pub resource_types: Vec<ResourceType>,
    /// Keep the provider's `cloud_name/<type>/upload/...` structure in target keys.
    pub keep_structure: bool,
    pub folders: Option<FolderFilter>,
    pub target_parent_path: Option<String>,
    /// Skip mappings whose target key already exists in the bucket.
    pub resume: bool,
    pub max_workers: usize,
    /// Resources per listing page. `None` means 500 when streaming and the provider
    /// default when listing everything up front.
    pub page_size: Option<u32>,
    pub pagination: Pagination,
    pub confirmation: Confirmation,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            resource_types: vec![ResourceType::Image, ResourceType::Raw, ResourceType::Video],
            keep_structure: false,
            folders: None,
            target_parent_path: None,
            resume: false,
            max_workers: DEFAULT_MAX_WORKERS,
            page_size: None,
            pagination: Pagination::default(),
            confirmation: Confirmation::default(),
        }
    }
}

impl MigrateConfig {
    /// Reject settings that cannot produce a run.
    pub fn validate(&self) -> Result<(), MigrateError> {
        if self.resource_types.is_empty() {
            return Err(MigrateError::Configuration(
                "at least one resource type is required".to_string(),
            ));
        }
        if self.max_workers == 0 {
            return Err(MigrateError::Configuration(
                "max_workers must be at least 1".to_string(),
            ));
        }
        if self.page_size == Some(0) {
            return Err(MigrateError::Configuration(
                "page_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn streaming_page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn trace_loaded(&self) {
        info!(
            resource_types = ?self.resource_types,
            keep_structure = self.keep_structure,
            resume = self.resume,
            max_workers = self.max_workers,
            page_size = ?self.page_size,
            pagination = ?self.pagination,
            confirmation = ?self.confirmation,
            "Loaded migration config"
        );
        debug!(?self, "Migration config loaded (full debug)");
    }
}

/// Parse a comma-separated resource type list such as `"image,raw,video"`.
///
/// Entries are trimmed, empty entries ignored and repeats collapsed in first-seen order.
pub fn parse_resource_types(list: &str) -> Result<Vec<ResourceType>, MigrateError> {
    let mut types = Vec::new();
    for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let resource_type: ResourceType = entry.parse()?;
        if !types.contains(&resource_type) {
            types.push(resource_type);
        }
    }
    Ok(types)
}
