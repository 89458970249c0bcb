//! Storage module for uploaded media
//!
//! Profile pictures are kept in a MinIO/S3-compatible bucket and linked
//! from the profile by their public URL.

mod minio_client;

pub use minio_client::MinIOClient;

use async_trait::async_trait;

use crate::core::error::AppError;

/// Object storage used for user uploaded media
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store `data` under `key` and return the public URL of the object
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str)
        -> Result<String, AppError>;

    async fn delete(&self, key: &str) -> Result<(), AppError>;
}
