//! `load_config` module: merges the optional YAML settings file, the environment and CLI flags
//! into the strongly-typed settings of a migration run.
//!
//! # Responsibilities
//! - Parse the user-supplied YAML file (non-secret settings only) into intermediate structs
//! - Overlay CLI flags, which clap has already backed with environment variables
//! - Map loosely-typed values (resource type lists, folder lists) onto core types
//! - Produce clear diagnostics: every failure names the flag or key to fix
//!
//! Precedence is flag/env > YAML > built-in default. Boolean switches are on when any of
//! the flag, the environment or the YAML file sets them.
//!
//! Secrets (API key/secret, S3 access keys) are never read from the YAML file.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use media_bucket_core::config::{
    parse_resource_types, Confirmation, MigrateConfig, Pagination, DEFAULT_MAX_WORKERS,
    DEFAULT_RESOURCE_TYPES,
};
use media_bucket_core::filter::FolderFilter;
use media_bucket_core::source::{CloudinaryCredentials, DEFAULT_API_BASE};
use serde::Deserialize;
use tracing::{error, info};

use crate::cli::MigrateArgs;
use crate::upload::{S3Settings, DEFAULT_REGION};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub source: SourceSection,
    #[serde(default)]
    pub destination: DestinationSection,
    #[serde(default)]
    pub migration: MigrationSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSection {
    pub cloud_name: Option<String>,
    pub api_base: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DestinationSection {
    pub endpoint_url: Option<String>,
    pub bucket: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationSection {
    pub resource_types: Option<String>,
    #[serde(default)]
    pub keep_cloud_name_in_path: bool,
    pub source_folders: Option<String>,
    pub target_parent_path: Option<String>,
    #[serde(default)]
    pub resume: bool,
    pub max_workers: Option<usize>,
    pub page_size: Option<u32>,
    pub pagination: Option<Pagination>,
    pub confirmation: Option<Confirmation>,
}

/// Fully merged settings for one CLI invocation.
#[derive(Debug)]
pub struct CliConfig {
    pub api_base: String,
    pub credentials: CloudinaryCredentials,
    pub destination: DestinationSection,
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    pub migrate: MigrateConfig,
}

impl CliConfig {
    /// Destination settings; only required by commands that touch the bucket.
    pub fn s3_settings(&self) -> Result<S3Settings> {
        Ok(S3Settings {
            endpoint_url: required(
                self.destination.endpoint_url.clone(),
                "S3 endpoint URL (--s3-endpoint-url or S3_ENDPOINT_URL)",
            )?,
            access_key_id: required(
                self.access_key_id.clone(),
                "S3 access key id (--s3-access-key-id or S3_ACCESS_KEY_ID)",
            )?,
            secret_access_key: required(
                self.secret_access_key.clone(),
                "S3 secret access key (--s3-secret-access-key or S3_SECRET_ACCESS_KEY)",
            )?,
            bucket: required(
                self.destination.bucket.clone(),
                "S3 bucket name (--s3-bucket-name or S3_BUCKET_NAME)",
            )?,
            region: self
                .destination
                .region
                .clone()
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
        })
    }
}

fn required(value: Option<String>, what: &str) -> Result<String> {
    match value.filter(|v| !v.trim().is_empty()) {
        Some(v) => Ok(v),
        None => {
            error!(setting = what, "Required setting missing");
            Err(anyhow!("missing {what}"))
        }
    }
}

/// Read and parse a YAML settings file.
pub fn read_file_config<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let content = fs::read_to_string(path_ref).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
        anyhow!("Failed to read config file {:?}: {}", path_ref, e)
    })?;

    let parsed: FileConfig = serde_yaml::from_str(&content).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
        anyhow!("Failed to parse config YAML: {e}")
    })?;
    info!(config_path = ?path_ref, "Parsed config YAML successfully");
    Ok(parsed)
}

/// Merge the YAML file named by `--config` (if any) with the CLI flags.
pub fn load_config(args: &MigrateArgs) -> Result<CliConfig> {
    let file = match &args.config {
        Some(path) => read_file_config(path)?,
        None => FileConfig::default(),
    };
    let section = file.migration;

    let resource_types_raw = args
        .resource_types
        .clone()
        .or(section.resource_types)
        .unwrap_or_else(|| DEFAULT_RESOURCE_TYPES.to_string());
    let resource_types = parse_resource_types(&resource_types_raw)
        .with_context(|| format!("invalid resource types '{resource_types_raw}'"))?;

    let folders = args
        .source_folders
        .as_deref()
        .or(section.source_folders.as_deref())
        .and_then(FolderFilter::parse);

    let pagination = if args.eager {
        Pagination::Eager
    } else {
        section.pagination.unwrap_or_default()
    };
    let confirmation = if args.yes {
        Confirmation::AutoProceed
    } else {
        section.confirmation.unwrap_or_default()
    };

    let migrate = MigrateConfig {
        resource_types,
        keep_structure: args.keep_cloud_name_in_path || section.keep_cloud_name_in_path,
        folders,
        target_parent_path: args
            .target_parent_path
            .clone()
            .or(section.target_parent_path)
            .filter(|p| !p.trim_matches('/').is_empty()),
        resume: args.resume || section.resume,
        max_workers: args
            .max_workers
            .or(section.max_workers)
            .unwrap_or(DEFAULT_MAX_WORKERS),
        page_size: args.page_size.or(section.page_size),
        pagination,
        confirmation,
    };
    migrate.validate()?;
    migrate.trace_loaded();

    let credentials = CloudinaryCredentials {
        cloud_name: required(
            args.cloudinary_cloud_name.clone().or(file.source.cloud_name),
            "cloud name (--cloudinary-cloud-name or CLOUDINARY_CLOUD_NAME)",
        )?,
        api_key: required(
            args.cloudinary_api_key.clone(),
            "API key (--cloudinary-api-key or CLOUDINARY_API_KEY)",
        )?,
        api_secret: required(
            args.cloudinary_api_secret.clone(),
            "API secret (--cloudinary-api-secret or CLOUDINARY_API_SECRET)",
        )?,
    };

    let destination = DestinationSection {
        endpoint_url: args.s3_endpoint_url.clone().or(file.destination.endpoint_url),
        bucket: args.s3_bucket_name.clone().or(file.destination.bucket),
        region: args.s3_region.clone().or(file.destination.region),
    };

    let api_base = args
        .cloudinary_api_base
        .clone()
        .or(file.source.api_base)
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

    info!(
        cloud_name = %credentials.cloud_name,
        api_base = %api_base,
        bucket = ?destination.bucket,
        "Config loaded and merged successfully"
    );

    Ok(CliConfig {
        api_base,
        credentials,
        destination,
        access_key_id: args.s3_access_key_id.clone(),
        secret_access_key: args.s3_secret_access_key.clone(),
        migrate,
    })
}
