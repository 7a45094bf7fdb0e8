//! Blob storage for uploaded resumes (S3 / MinIO).
//!
//! Clients never stream files through the API: they PUT straight to a
//! presigned URL, then reference the object key in later requests.

pub mod handlers;

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Presigned PUT URL for `key`, bound to `content_type` and valid for `expires_in`.
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, AppError>;

    /// Full contents of the object at `key`.
    async fn download(&self, key: &str) -> Result<Bytes, AppError>;
}

#[derive(Clone)]
pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3BlobStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, AppError> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| AppError::S3(format!("Invalid presign expiry: {e}")))?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| AppError::S3(format!("Presigning PUT for {key} failed: {e}")))?;

        Ok(request.uri().to_string())
    }

    async fn download(&self, key: &str) -> Result<Bytes, AppError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::S3(format!("S3 download of {key} failed: {e}")))?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| AppError::S3(format!("Reading s3://{}/{key} failed: {e}", self.bucket)))?;

        let bytes = data.into_bytes();
        info!(
            "Downloaded s3://{}/{} ({} bytes)",
            self.bucket,
            key,
            bytes.len()
        );
        Ok(bytes)
    }
}
