//! Object storage client for uploaded images.
//!
//! Payment proofs and product photos are pushed to an S3-compatible HTTP
//! store; only the resulting public URL is persisted. When storage is not
//! configured the client degrades to a no-op that still returns a URL, so
//! checkout and proof upload keep working in development and demo setups.

use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::StorageConfig;

/// Bucket for buyer-uploaded proof of payment images.
pub const PAYMENT_PROOFS_BUCKET: &str = "payment-proofs";

/// Bucket for seller product photos.
pub const PRODUCT_IMAGES_BUCKET: &str = "product-images";

/// Errors from the storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("storage responded with status {0}")]
    Failed(reqwest::StatusCode),
}

/// Client for the object storage HTTP API.
#[derive(Clone)]
pub enum StorageClient {
    Remote(RemoteStorage),
    /// No storage configured; uploads are dropped but still yield a URL.
    Noop,
}

/// The configured remote backend.
#[derive(Clone)]
pub struct RemoteStorage {
    http: reqwest::Client,
    base_url: String,
    service_key: secrecy::SecretString,
}

impl StorageClient {
    /// Build a client from the optional storage configuration.
    #[must_use]
    pub fn new(config: Option<&StorageConfig>) -> Self {
        match config {
            Some(cfg) => Self::Remote(RemoteStorage {
                http: reqwest::Client::new(),
                base_url: cfg.base_url.trim_end_matches('/').to_owned(),
                service_key: cfg.service_key.clone(),
            }),
            None => {
                tracing::warn!("object storage not configured, uploads will be dropped");
                Self::Noop
            }
        }
    }

    /// Upload a file and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend rejects the upload. The no-op
    /// client never fails.
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        match self {
            Self::Remote(remote) => remote.upload(bucket, path, content_type, bytes).await,
            Self::Noop => {
                tracing::warn!(bucket, path, "dropping upload, storage not configured");
                Ok(format!("noop://{bucket}/{path}"))
            }
        }
    }
}

impl RemoteStorage {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        let url = format!("{}/object/{bucket}/{path}", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.service_key.expose_secret())
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StorageError::Failed(response.status()));
        }

        Ok(format!("{}/object/public/{bucket}/{path}", self.base_url))
    }
}
