use std::env;
use std::fs::write;

use clap::Parser;
use media_bucket::load_config::load_config;
use media_bucket::{Cli, Commands, MigrateArgs};
use media_bucket_core::config::{Confirmation, Pagination};
use media_bucket_core::contract::ResourceType;
use serial_test::serial;
use tempfile::NamedTempFile;

const MANAGED_VARS: &[&str] = &[
    "MEDIA_BUCKET_CONFIG",
    "CLOUDINARY_CLOUD_NAME",
    "CLOUDINARY_API_KEY",
    "CLOUDINARY_API_SECRET",
    "CLOUDINARY_API_BASE",
    "S3_ENDPOINT_URL",
    "S3_ACCESS_KEY_ID",
    "S3_SECRET_ACCESS_KEY",
    "S3_BUCKET_NAME",
    "S3_REGION",
    "MEDIA_BUCKET_RESOURCE_TYPES",
    "MEDIA_BUCKET_KEEP_CLOUD_NAME_IN_PATH",
    "MEDIA_BUCKET_SOURCE_FOLDERS",
    "MEDIA_BUCKET_TARGET_PARENT_PATH",
    "MEDIA_BUCKET_RESUME",
    "MEDIA_BUCKET_MAX_WORKERS",
    "MEDIA_BUCKET_PAGE_SIZE",
    "MEDIA_BUCKET_EAGER",
    "MEDIA_BUCKET_YES",
];

fn clear_env() {
    for var in MANAGED_VARS {
        env::remove_var(var);
    }
}

fn set_secrets() {
    env::set_var("CLOUDINARY_API_KEY", "key-123");
    env::set_var("CLOUDINARY_API_SECRET", "secret-456");
    env::set_var("S3_ACCESS_KEY_ID", "AKIDEXAMPLE");
    env::set_var("S3_SECRET_ACCESS_KEY", "wJalrXUtnFEMI");
}

fn parse(args: &[&str]) -> MigrateArgs {
    let mut argv = vec!["media-bucket", "migrate"];
    argv.extend_from_slice(args);
    match Cli::try_parse_from(argv).expect("arguments should parse").command {
        Commands::Migrate(args) => args,
        Commands::Plan(_) => panic!("expected the migrate command"),
    }
}

fn config_file(yaml: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), yaml).expect("write config");
    file
}

const FULL_YAML: &str = r#"
source:
  cloud_name: demo
destination:
  endpoint_url: http://localhost:9000
  bucket: media
  region: eu-west-1
migration:
  resource_types: image,video
  source_folders: /samples/rats, /samples/cats
  target_parent_path: backup
  resume: true
  max_workers: 8
  page_size: 100
  pagination: eager
  confirmation: auto-proceed
"#;

#[test]
#[serial]
fn test_yaml_settings_and_env_secrets_are_merged() {
    clear_env();
    set_secrets();
    let file = config_file(FULL_YAML);

    let args = parse(&["--config", file.path().to_str().expect("utf-8 path")]);
    let config = load_config(&args).expect("config should load");

    assert_eq!(config.credentials.cloud_name, "demo");
    assert_eq!(config.credentials.api_key, "key-123");
    assert_eq!(config.api_base, "https://api.cloudinary.com/v1_1");
    assert_eq!(
        config.migrate.resource_types,
        vec![ResourceType::Image, ResourceType::Video]
    );
    assert_eq!(
        config
            .migrate
            .folders
            .as_ref()
            .map(|f| f.folders().to_vec()),
        Some(vec!["/samples/rats".to_string(), "/samples/cats".to_string()])
    );
    assert_eq!(config.migrate.target_parent_path.as_deref(), Some("backup"));
    assert!(config.migrate.resume);
    assert!(!config.migrate.keep_structure);
    assert_eq!(config.migrate.max_workers, 8);
    assert_eq!(config.migrate.page_size, Some(100));
    assert_eq!(config.migrate.pagination, Pagination::Eager);
    assert_eq!(config.migrate.confirmation, Confirmation::AutoProceed);

    let s3 = config.s3_settings().expect("s3 settings");
    assert_eq!(s3.endpoint_url, "http://localhost:9000");
    assert_eq!(s3.bucket, "media");
    assert_eq!(s3.region, "eu-west-1");
    assert_eq!(s3.access_key_id, "AKIDEXAMPLE");
    clear_env();
}

#[test]
#[serial]
fn test_flags_and_env_win_over_yaml() {
    clear_env();
    set_secrets();
    env::set_var("S3_BUCKET_NAME", "from-env");
    env::set_var("MEDIA_BUCKET_MAX_WORKERS", "3");
    let file = config_file(FULL_YAML);

    let args = parse(&[
        "--config",
        file.path().to_str().expect("utf-8 path"),
        "--cloudinary-cloud-name",
        "flagcloud",
        "--resource-types",
        "raw",
        "--page-size",
        "10",
        "--keep-cloud-name-in-path",
    ]);
    let config = load_config(&args).expect("config should load");

    assert_eq!(config.credentials.cloud_name, "flagcloud");
    assert_eq!(config.migrate.resource_types, vec![ResourceType::Raw]);
    assert_eq!(config.migrate.page_size, Some(10));
    assert_eq!(config.migrate.max_workers, 3);
    assert!(config.migrate.keep_structure);
    assert_eq!(
        config.s3_settings().expect("s3 settings").bucket,
        "from-env"
    );
    clear_env();
}

#[test]
#[serial]
fn test_defaults_apply_without_a_settings_file() {
    clear_env();
    set_secrets();

    let args = parse(&["--cloudinary-cloud-name", "demo"]);
    let config = load_config(&args).expect("config should load");

    assert_eq!(
        config.migrate.resource_types,
        vec![ResourceType::Image, ResourceType::Raw, ResourceType::Video]
    );
    assert_eq!(config.migrate.max_workers, 25);
    assert_eq!(config.migrate.page_size, None);
    assert_eq!(config.migrate.streaming_page_size(), 500);
    assert_eq!(config.migrate.pagination, Pagination::Streaming);
    assert_eq!(config.migrate.confirmation, Confirmation::Interactive);
    assert!(config.migrate.folders.is_none());
    assert!(config.migrate.target_parent_path.is_none());

    let err = config.s3_settings().unwrap_err();
    assert!(
        err.to_string().contains("S3_ENDPOINT_URL"),
        "unexpected error: {err}"
    );
    clear_env();
}

#[test]
#[serial]
fn test_missing_api_secret_names_the_variable() {
    clear_env();
    env::set_var("CLOUDINARY_API_KEY", "key-123");

    let args = parse(&["--cloudinary-cloud-name", "demo"]);
    let err = load_config(&args).unwrap_err();

    assert!(
        err.to_string().contains("CLOUDINARY_API_SECRET"),
        "unexpected error: {err}"
    );
    clear_env();
}

#[test]
#[serial]
fn test_rejects_unknown_resource_type() {
    clear_env();
    set_secrets();

    let args = parse(&[
        "--cloudinary-cloud-name",
        "demo",
        "--resource-types",
        "image,audio",
    ]);
    let err = load_config(&args).unwrap_err();
    let msg = format!("{err:#}");

    assert!(msg.contains("audio"), "unexpected error: {msg}");
    clear_env();
}

#[test]
#[serial]
fn test_rejects_zero_workers() {
    clear_env();
    set_secrets();

    let args = parse(&["--cloudinary-cloud-name", "demo", "--max-workers", "0"]);
    let err = load_config(&args).unwrap_err();

    assert!(
        format!("{err:#}").contains("max_workers"),
        "unexpected error: {err:#}"
    );
    clear_env();
}

#[test]
#[serial]
fn test_blank_parent_path_is_ignored() {
    clear_env();
    set_secrets();

    let args = parse(&[
        "--cloudinary-cloud-name",
        "demo",
        "--target-parent-path",
        "//",
    ]);
    let config = load_config(&args).expect("config should load");

    assert!(config.migrate.target_parent_path.is_none());
    clear_env();
}

#[test]
#[serial]
fn test_invalid_yaml_is_reported() {
    clear_env();
    set_secrets();
    let file = config_file("migration: [not, a, map");

    let args = parse(&[
        "--cloudinary-cloud-name",
        "demo",
        "--config",
        file.path().to_str().expect("utf-8 path"),
    ]);
    let err = load_config(&args).unwrap_err();

    assert!(
        err.to_string().contains("Failed to parse config YAML"),
        "unexpected error: {err}"
    );
    clear_env();
}

#[test]
#[serial]
fn test_unknown_yaml_key_is_rejected() {
    clear_env();
    set_secrets();
    let file = config_file("source:\n  cloud_name: demo\n  api_secret: nope\n");

    let args = parse(&["--config", file.path().to_str().expect("utf-8 path")]);

    assert!(load_config(&args).is_err());
    clear_env();
}
