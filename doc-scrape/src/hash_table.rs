//! DynamoDB implementation of the core `HashStore` trait.
//!
//! Items are keyed on `id` (the page URL) and carry `url` and `hash`
//! attributes. `PutItem` replaces the whole item, so updating a record is the
//! same call as creating it.

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use doc_scrape_core::contract::{HashRecord, HashStore, StoreError};

const KEY_ATTR: &str = "id";
const URL_ATTR: &str = "url";
const HASH_ATTR: &str = "hash";

pub struct DynamoHashStore {
    client: aws_sdk_dynamodb::Client,
    table: String,
}

impl DynamoHashStore {
    pub fn new(sdk_config: &aws_config::SdkConfig, table: impl Into<String>) -> Self {
        let table = table.into();
        tracing::info!(table = %table, "Initialised DynamoDB hash store");
        Self {
            client: aws_sdk_dynamodb::Client::new(sdk_config),
            table,
        }
    }
}

#[async_trait]
impl HashStore for DynamoHashStore {
    async fn get_hash(&self, url: &str) -> Result<Option<HashRecord>, StoreError> {
        tracing::debug!(table = %self.table, url, "Reading stored hash");
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(KEY_ATTR, AttributeValue::S(url.to_string()))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(table = %self.table, url, error = %DisplayErrorContext(&e), "DynamoDB GetItem failed");
                e
            })?;

        let hash = output
            .item()
            .and_then(|item| item.get(HASH_ATTR))
            .and_then(|value| value.as_s().ok())
            .cloned();

        Ok(hash.map(|hash| HashRecord {
            url: url.to_string(),
            hash,
        }))
    }

    async fn put_hash(&self, record: &HashRecord) -> Result<(), StoreError> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table)
            .item(KEY_ATTR, AttributeValue::S(record.url.clone()))
            .item(URL_ATTR, AttributeValue::S(record.url.clone()))
            .item(HASH_ATTR, AttributeValue::S(record.hash.clone()))
            .send()
            .await;

        match result {
            Ok(_) => {
                tracing::info!(table = %self.table, url = %record.url, "Hash saved successfully");
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    table = %self.table,
                    url = %record.url,
                    error = %DisplayErrorContext(&e),
                    "DynamoDB PutItem failed"
                );
                Err(Box::new(e))
            }
        }
    }
}
