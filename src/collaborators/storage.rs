//! Object storage (REST API of a hosted storage bucket).

use crate::error::ApiError;
use crate::image::InlineImage;
use crate::provider::truncate;
use async_trait::async_trait;
use reqwest::Client;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload an inline image and return its public URL.
    async fn upload(&self, image: &InlineImage) -> Result<String, ApiError>;
}

/// `{unix_ms}_{content-hash-prefix}.{ext}`
pub fn object_name(image: &InlineImage, unix_ms: u64) -> String {
    let hash = blake3::hash(&image.bytes);
    format!("{}_{}.{}", unix_ms, &hash.to_hex()[..12], image.extension())
}

pub struct RestObjectStore {
    client: Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl RestObjectStore {
    pub fn new(client: Client, base_url: &str, api_key: String, bucket: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            bucket,
        }
    }

    pub fn upload_url(&self, name: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, name)
    }

    pub fn public_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, name
        )
    }
}

#[async_trait]
impl ObjectStore for RestObjectStore {
    async fn upload(&self, image: &InlineImage) -> Result<String, ApiError> {
        let unix_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let name = object_name(image, unix_ms);
        debug!(bucket = %self.bucket, object = %name, bytes = image.bytes.len(), "uploading image");

        let response = self
            .client
            .put(self.upload_url(&name))
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, &image.mime)
            .header("x-upsert", "true")
            .body(image.bytes.clone())
            .send()
            .await
            .map_err(|e| ApiError::StorageUploadFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::StorageUploadFailed(format!(
                "{}: {}",
                status,
                truncate(&body, 300)
            )));
        }

        let url = self.public_url(&name);
        info!(object = %name, "image uploaded");
        Ok(url)
    }
}
