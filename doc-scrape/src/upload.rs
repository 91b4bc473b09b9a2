#![doc = "S3 implementation of the core `ObjectStore` trait."]
//
//! # Markdown upload (CLI <-> S3)
//!
//! Bridges [`doc_scrape_core::contract::ObjectStore`] to Amazon S3. Each
//! markdown artifact is written with `PutObject`, which replaces any object
//! already stored under the key.
//!
//! - Construct [`S3ObjectStore`] from a shared `aws_config::SdkConfig`
//!   (see [`load_sdk_config`]).
//! - Credentials and region come from the standard AWS provider chain, with
//!   optional overrides from the config file's `aws` section.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use doc_scrape_core::contract::{ObjectStore, StoreError};

use crate::load_config::AwsSection;

const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

/// Loads the shared AWS configuration, applying region/endpoint overrides.
pub async fn load_sdk_config(aws: &AwsSection) -> aws_config::SdkConfig {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(region) = &aws.region {
        loader = loader.region(aws_config::Region::new(region.clone()));
    }
    if let Some(endpoint) = &aws.endpoint_url {
        loader = loader.endpoint_url(endpoint.as_str());
    }
    let sdk_config = loader.load().await;
    tracing::info!(
        region = ?sdk_config.region(),
        endpoint_override = aws.endpoint_url.is_some(),
        "Loaded AWS configuration"
    );
    sdk_config
}

pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(sdk_config: &aws_config::SdkConfig, bucket: impl Into<String>) -> Self {
        let bucket = bucket.into();
        // LocalStack and most S3-compatible endpoints need path-style addressing.
        let s3_config = aws_sdk_s3::config::Builder::from(sdk_config)
            .force_path_style(sdk_config.endpoint_url().is_some())
            .build();
        tracing::info!(bucket = %bucket, "Initialised S3 object store");
        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket,
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_markdown(&self, key: &str, markdown: &str) -> Result<(), StoreError> {
        tracing::info!(bucket = %self.bucket, key, "Uploading markdown object");
        let result = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(MARKDOWN_CONTENT_TYPE)
            .body(ByteStream::from(markdown.as_bytes().to_vec()))
            .send()
            .await;

        match result {
            Ok(_) => {
                tracing::info!(bucket = %self.bucket, key, "File uploaded to S3");
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    bucket = %self.bucket,
                    key,
                    error = %DisplayErrorContext(&e),
                    "S3 PutObject failed"
                );
                Err(Box::new(e))
            }
        }
    }
}
