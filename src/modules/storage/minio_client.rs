//! Profile picture storage on MinIO (or any S3-compatible server).

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use crate::core::config::MinIOConfig;
use crate::core::error::AppError;
use crate::modules::storage::MediaStorage;

fn storage_error(action: &str, e: impl std::fmt::Display) -> AppError {
    AppError::Storage(format!("{}: {}", action, e))
}

/// Creating a bucket we already have is not a failure
fn is_existing_bucket(e: &S3Error) -> bool {
    let message = e.to_string();
    ["BucketAlreadyOwnedByYou", "BucketAlreadyExists", "already own it"]
        .iter()
        .any(|marker| message.contains(marker))
}

pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    /// `<public endpoint>/<bucket>`, the prefix of every object URL
    public_base_url: String,
}

impl MinIOClient {
    pub async fn new(config: MinIOConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| storage_error("Invalid MinIO credentials", e))?;

        let region = Region::Custom {
            region: config.region,
            endpoint: config.endpoint.clone(),
        };

        // MinIO serves buckets under the endpoint path, not as subdomains
        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| storage_error("Invalid MinIO bucket settings", e))?;
        bucket.set_path_style();

        let public_base_url = format!(
            "{}/{}",
            config.public_endpoint.trim_end_matches('/'),
            config.bucket
        );

        info!(
            "Media storage at {} (bucket '{}')",
            config.endpoint, config.bucket
        );

        Ok(Self {
            bucket,
            region,
            credentials,
            public_base_url,
        })
    }

    /// Create the bucket on first start
    pub async fn ensure_bucket_exists(&self) -> Result<(), AppError> {
        let name = self.bucket.name();
        let created = Bucket::create_with_path_style(
            &name,
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await;

        match created {
            Ok(_) => info!(
                "Created bucket '{}'. Allow anonymous downloads so pictures can be shown \
                 (mc anonymous set download <alias>/{})",
                name, name
            ),
            Err(e) if is_existing_bucket(&e) => debug!("Bucket '{}' already exists", name),
            Err(e) => warn!("Could not create bucket '{}': {}. Assuming it exists.", name, e),
        }

        Ok(())
    }

    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }

    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

#[async_trait]
impl MediaStorage for MinIOClient {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AppError> {
        self.bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| storage_error(&format!("Failed to store '{}'", key), e))?;

        debug!("Stored {} bytes at '{}'", data.len(), key);
        Ok(self.object_url(key))
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.bucket
            .delete_object(key)
            .await
            .map_err(|e| storage_error(&format!("Failed to delete '{}'", key), e))?;

        debug!("Deleted '{}'", key);
        Ok(())
    }
}
