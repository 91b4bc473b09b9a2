/// `load_config` module: Loads a static YAML config, injecting environment
/// values for the storage targets, into the CLI's [`CliConfig`].
///
/// # Responsibilities
/// - Parse the user-supplied YAML file into type-safe structs
/// - Fill in the bucket and table names from `S3_DATA_BUCKET` / `HASHES_TABLE`
///   when the file leaves them empty
/// - Fail with a clear message when anything required is missing
///
/// # Errors
/// All errors use `anyhow::Error` and surface at the CLI boundary.
use anyhow::Result;
use doc_scrape_core::config::ScrapeConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const BUCKET_ENV: &str = "S3_DATA_BUCKET";
pub const TABLE_ENV: &str = "HASHES_TABLE";

#[derive(Debug, Deserialize)]
pub struct CliConfig {
    #[serde(flatten)]
    pub scrape: ScrapeConfig,
    pub storage: StorageConfig,
    pub hashes: HashesConfig,
    #[serde(default)]
    pub aws: AwsSection,
    #[serde(default)]
    pub pages: Vec<String>,
}

/// Where markdown artifacts are written.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageConfig {
    S3 {
        #[serde(default)]
        bucket: String,
    },
    Local {
        dir: PathBuf,
    },
}

/// Where hash records are kept.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HashesConfig {
    Dynamodb {
        #[serde(default)]
        table: String,
    },
    JsonFile {
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AwsSection {
    pub region: Option<String>,
    /// Overrides the service endpoint, e.g. for LocalStack.
    pub endpoint_url: Option<String>,
}

/// Loads a static YAML config file and injects env vars for empty targets.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let mut config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    if let StorageConfig::S3 { bucket } = &mut config.storage {
        if bucket.is_empty() {
            *bucket = env_or_bail(BUCKET_ENV, "storage.bucket")?;
        }
    }
    if let HashesConfig::Dynamodb { table } = &mut config.hashes {
        if table.is_empty() {
            *table = env_or_bail(TABLE_ENV, "hashes.table")?;
        }
    }

    config.scrape.trace_loaded();
    info!(
        pages = config.pages.len(),
        storage = ?config.storage,
        hashes = ?config.hashes,
        "Config loaded and merged successfully"
    );
    Ok(config)
}

fn env_or_bail(var: &str, field: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => {
            info!(var, "Using value from environment");
            Ok(value.trim().to_string())
        }
        _ => {
            error!(var, field, "Neither config nor environment provides a value");
            anyhow::bail!("{field} is not set in the config and {var} is not set in the environment")
        }
    }
}
