//! Backend selection: turns the `storage` and `hashes` config sections into
//! concrete stores the core pipeline can be run against.

use async_trait::async_trait;
use doc_scrape_core::contract::{HashRecord, HashStore, ObjectStore, StoreError};
use doc_scrape_core::local::{JsonFileHashStore, LocalObjectStore};
use tokio::sync::OnceCell;

use crate::hash_table::DynamoHashStore;
use crate::load_config::{CliConfig, HashesConfig, StorageConfig};
use crate::upload::{load_sdk_config, S3ObjectStore};

pub enum ObjectBackend {
    S3(S3ObjectStore),
    Local(LocalObjectStore),
}

pub enum HashBackend {
    Dynamo(DynamoHashStore),
    JsonFile(JsonFileHashStore),
}

/// Builds both stores; AWS configuration is only loaded when a section needs it.
pub async fn build_backends(config: &CliConfig) -> (ObjectBackend, HashBackend) {
    let sdk_config = OnceCell::new();

    let objects = match &config.storage {
        StorageConfig::S3 { bucket } => {
            let sdk = sdk_config.get_or_init(|| load_sdk_config(&config.aws)).await;
            ObjectBackend::S3(S3ObjectStore::new(sdk, bucket))
        }
        StorageConfig::Local { dir } => ObjectBackend::Local(LocalObjectStore::new(dir)),
    };

    let hashes = match &config.hashes {
        HashesConfig::Dynamodb { table } => {
            let sdk = sdk_config.get_or_init(|| load_sdk_config(&config.aws)).await;
            HashBackend::Dynamo(DynamoHashStore::new(sdk, table))
        }
        HashesConfig::JsonFile { path } => HashBackend::JsonFile(JsonFileHashStore::new(path)),
    };

    tracing::info!(
        storage = objects.kind(),
        hashes = hashes.kind(),
        "Storage backends ready"
    );
    (objects, hashes)
}

impl ObjectBackend {
    pub fn kind(&self) -> &'static str {
        match self {
            ObjectBackend::S3(_) => "s3",
            ObjectBackend::Local(_) => "local",
        }
    }
}

impl HashBackend {
    pub fn kind(&self) -> &'static str {
        match self {
            HashBackend::Dynamo(_) => "dynamodb",
            HashBackend::JsonFile(_) => "json_file",
        }
    }
}

#[async_trait]
impl ObjectStore for ObjectBackend {
    async fn put_markdown(&self, key: &str, markdown: &str) -> Result<(), StoreError> {
        match self {
            ObjectBackend::S3(s3) => s3.put_markdown(key, markdown).await,
            ObjectBackend::Local(local) => local.put_markdown(key, markdown).await,
        }
    }
}

#[async_trait]
impl HashStore for HashBackend {
    async fn get_hash(&self, url: &str) -> Result<Option<HashRecord>, StoreError> {
        match self {
            HashBackend::Dynamo(dynamo) => dynamo.get_hash(url).await,
            HashBackend::JsonFile(file) => file.get_hash(url).await,
        }
    }

    async fn put_hash(&self, record: &HashRecord) -> Result<(), StoreError> {
        match self {
            HashBackend::Dynamo(dynamo) => dynamo.put_hash(record).await,
            HashBackend::JsonFile(file) => file.put_hash(record).await,
        }
    }
}
