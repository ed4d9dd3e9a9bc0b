//! S3 implementation of the object store boundary
//!
//! The AWS SDK is async; the walker's workers are plain threads. The store
//! owns a small multi-thread tokio runtime used only to drive SDK calls,
//! so each worker's `upload` is an ordinary blocking call from its point
//! of view. Concurrent `block_on` calls from multiple workers are fine on
//! a multi-thread runtime.

use crate::error::StoreError;
use crate::store::ObjectStore;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;
use tracing::debug;

/// Region used for the bucket endpoint
const DEFAULT_REGION: &str = "us-east-1";

/// S3-backed object store
pub struct S3Store {
    client: Client,
    bucket: String,
    runtime: tokio::runtime::Runtime,
}

impl S3Store {
    /// Build a client from static credentials, bound to one bucket
    pub fn connect(
        access_key: &str,
        secret_key: &str,
        bucket: String,
    ) -> Result<Self, StoreError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| StoreError::Init {
                reason: e.to_string(),
            })?;

        let client = runtime.block_on(async {
            let config = aws_config::from_env()
                .region(Region::new(DEFAULT_REGION))
                .credentials_provider(Credentials::new(
                    access_key, secret_key, None, None, "static",
                ))
                .load()
                .await;

            Client::new(&config)
        });

        debug!(bucket = %bucket, region = DEFAULT_REGION, "S3 client ready");

        Ok(Self {
            client,
            bucket,
            runtime,
        })
    }

    /// The bucket this store uploads into
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

impl ObjectStore for S3Store {
    fn upload(&self, key: &str, source: &Path) -> Result<(), StoreError> {
        self.runtime.block_on(async {
            let body = ByteStream::from_path(source)
                .await
                .map_err(|e| StoreError::ReadSource {
                    path: source.to_path_buf(),
                    reason: e.to_string(),
                })?;

            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(key)
                .body(body)
                .send()
                .await
                .map_err(|e| StoreError::UploadFailed {
                    key: key.to_string(),
                    reason: e.to_string(),
                })?;

            Ok(())
        })
    }
}
