//! Filesystem-backed stores for running the pipeline without cloud services.
//!
//! [`LocalObjectStore`] mirrors object keys as paths below a root directory and
//! [`JsonFileHashStore`] keeps every hash record in one JSON document.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, error};

use crate::contract::{HashRecord, HashStore, ObjectStore, StoreError};

pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put_markdown(&self, key: &str, markdown: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                error!(error = ?e, path = %parent.display(), "Failed to create output directory");
                e
            })?;
        }
        tokio::fs::write(&path, markdown).await.map_err(|e| {
            error!(error = ?e, path = %path.display(), "Failed to write markdown file");
            e
        })?;
        debug!(path = %path.display(), "Wrote markdown file");
        Ok(())
    }
}

/// Hash records as a JSON object keyed by URL.
pub struct JsonFileHashStore {
    path: PathBuf,
}

impl JsonFileHashStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<BTreeMap<String, HashRecord>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => {
                error!(error = ?e, path = %self.path.display(), "Failed to read hash file");
                Err(e.into())
            }
        }
    }

    async fn save(&self, records: &BTreeMap<String, HashRecord>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(records)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl HashStore for JsonFileHashStore {
    async fn get_hash(&self, url: &str) -> Result<Option<HashRecord>, StoreError> {
        let mut records = self.load().await?;
        Ok(records.remove(url))
    }

    async fn put_hash(&self, record: &HashRecord) -> Result<(), StoreError> {
        let mut records = self.load().await?;
        records.insert(record.url.clone(), record.clone());
        self.save(&records).await?;
        debug!(url = %record.url, path = %self.path.display(), "Stored hash record");
        Ok(())
    }
}
