use crate::config::credentials::AwsCredentials;
use crate::domain::ports::ObjectStore;
use crate::utils::error::{Result, RouterError};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::Client as S3Client;

#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
}

impl S3ObjectStore {
    pub async fn new(credentials: &AwsCredentials, bucket: String) -> Self {
        let provider = Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            None,
            None,
            "ryze-router",
        );
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(credentials.region.clone()))
            .credentials_provider(provider)
            .load()
            .await;

        Self {
            client: S3Client::new(&config),
            bucket,
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, body: &[u8], content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body.to_vec().into())
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| RouterError::StorageError {
                message: format!("Failed to write to S3: {}", e),
            })?;

        Ok(())
    }
}
