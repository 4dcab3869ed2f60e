use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use media_bucket_core::contract::Console;
use media_bucket_core::migrate::{migrate, plan};
use media_bucket_core::source::{CloudinaryClient, HttpFetcher};

use crate::console::TerminalConsole;
use crate::load_config::load_config;
use crate::upload::BucketStore;

/// CLI for media-bucket: copy hosted media resources into an S3-compatible bucket.
#[derive(Parser)]
#[clap(
    name = "media-bucket",
    version,
    about = "Migrate Cloudinary-hosted media into an S3-compatible bucket"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List, confirm and transfer every matching resource
    Migrate(MigrateArgs),
    /// Print the source to target mapping without transferring anything
    Plan(MigrateArgs),
}

/// Flags shared by every command. Each can also be set from the environment.
#[derive(Args, Clone, Default)]
pub struct MigrateArgs {
    /// Path to a YAML settings file (non-secret settings only)
    #[clap(long, env = "MEDIA_BUCKET_CONFIG")]
    pub config: Option<PathBuf>,

    #[clap(long, env = "CLOUDINARY_CLOUD_NAME")]
    pub cloudinary_cloud_name: Option<String>,
    #[clap(long, env = "CLOUDINARY_API_KEY", hide_env_values = true)]
    pub cloudinary_api_key: Option<String>,
    #[clap(long, env = "CLOUDINARY_API_SECRET", hide_env_values = true)]
    pub cloudinary_api_secret: Option<String>,
    /// Admin API base URL
    #[clap(long, env = "CLOUDINARY_API_BASE")]
    pub cloudinary_api_base: Option<String>,

    #[clap(long, env = "S3_ENDPOINT_URL")]
    pub s3_endpoint_url: Option<String>,
    #[clap(long, env = "S3_ACCESS_KEY_ID", hide_env_values = true)]
    pub s3_access_key_id: Option<String>,
    #[clap(long, env = "S3_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub s3_secret_access_key: Option<String>,
    #[clap(long, env = "S3_BUCKET_NAME")]
    pub s3_bucket_name: Option<String>,
    /// Bucket region [default: us-east-1]
    #[clap(long, env = "S3_REGION")]
    pub s3_region: Option<String>,

    /// Comma-separated resource types [default: image,raw,video]
    #[clap(long, env = "MEDIA_BUCKET_RESOURCE_TYPES")]
    pub resource_types: Option<String>,
    /// Keep the `cloud_name/<type>/upload/...` structure in target keys
    #[clap(long, env = "MEDIA_BUCKET_KEEP_CLOUD_NAME_IN_PATH")]
    pub keep_cloud_name_in_path: bool,
    /// Comma-separated folder prefixes; only URLs containing one are migrated
    #[clap(long, env = "MEDIA_BUCKET_SOURCE_FOLDERS")]
    pub source_folders: Option<String>,
    /// Prefix prepended to every target key
    #[clap(long, env = "MEDIA_BUCKET_TARGET_PARENT_PATH")]
    pub target_parent_path: Option<String>,
    /// Skip resources whose target key already exists
    #[clap(long, env = "MEDIA_BUCKET_RESUME")]
    pub resume: bool,
    /// Concurrent transfers per batch [default: 25]
    #[clap(long, env = "MEDIA_BUCKET_MAX_WORKERS")]
    pub max_workers: Option<usize>,
    /// Resources requested per listing page [default: 500; provider default for --eager and plan]
    #[clap(long, env = "MEDIA_BUCKET_PAGE_SIZE")]
    pub page_size: Option<u32>,
    /// List everything up front and confirm the full mapping once
    #[clap(long, env = "MEDIA_BUCKET_EAGER")]
    pub eager: bool,
    /// Proceed without asking for confirmation
    #[clap(long, env = "MEDIA_BUCKET_YES")]
    pub yes: bool,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Migrate(args) => run_migrate(&args).await,
        Commands::Plan(args) => run_plan(&args).await,
    }
}

async fn run_migrate(args: &MigrateArgs) -> Result<()> {
    let config = load_config(args)?;
    let s3 = config.s3_settings()?;

    let http = reqwest::Client::new();
    let lister = CloudinaryClient::new(
        http.clone(),
        config.api_base.clone(),
        config.credentials.clone(),
    )?;
    let fetcher = HttpFetcher::new(http);
    let destination = BucketStore::new(&s3)?;
    let console = TerminalConsole;

    println!("Migration starting...");
    let report = migrate(&config.migrate, &lister, &fetcher, &destination, &console)
        .await
        .context("migration failed")?;

    if report.declined {
        print!("{report}");
        return Ok(());
    }
    println!("Migration complete.");
    print!("{report}");
    Ok(())
}

async fn run_plan(args: &MigrateArgs) -> Result<()> {
    let config = load_config(args)?;
    let lister = CloudinaryClient::new(
        reqwest::Client::new(),
        config.api_base.clone(),
        config.credentials.clone(),
    )?;
    let console = TerminalConsole;

    let planned = plan(&config.migrate, &lister)
        .await
        .context("planning failed")?;

    let mut total = 0;
    for (resource_type, mappings) in &planned {
        let rows: Vec<(String, String)> = mappings
            .iter()
            .map(|m| (m.source_url.clone(), m.target_key.clone()))
            .collect();
        total += rows.len();
        console.show_mappings(&format!("{resource_type} mappings"), &rows);
    }
    println!("Resources to migrate: {total}");
    Ok(())
}
