//! Content hashing and change detection against a [`HashStore`].

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::contract::{ChangeStatus, HashRecord, HashStore, StoreError};

/// SHA-256 of `content`, lowercase hex.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Compares `hash` with the stored record for `url`, writing it when it is
/// new or different.
pub async fn track<H>(store: &H, url: &str, hash: &str) -> Result<ChangeStatus, StoreError>
where
    H: HashStore + ?Sized,
{
    let status = match store.get_hash(url).await? {
        Some(existing) if existing.hash == hash => {
            debug!(url = %url, hash = %hash, "Stored hash matches, leaving record as is");
            return Ok(ChangeStatus::Unchanged);
        }
        Some(_) => ChangeStatus::Changed,
        None => ChangeStatus::New,
    };

    let record = HashRecord {
        url: url.to_string(),
        hash: hash.to_string(),
    };
    store.put_hash(&record).await?;
    info!(url = %url, hash = %hash, ?status, "Hash saved");
    Ok(status)
}
