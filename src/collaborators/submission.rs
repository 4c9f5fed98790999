//! Explicit submission endpoint: validate contact details, upload the sticker,
//! return a submission id.

use super::storage::ObjectStore;
use crate::contact::{normalize_email, normalize_name};
use crate::error::{ApiError, ValidationError};
use crate::image::InlineImage;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

static SUBMISSION_COUNTER: AtomicU64 = AtomicU64::new(1);

pub fn new_submission_id() -> String {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let seq = SUBMISSION_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("sub_{ts}_{seq}")
}

/// Incoming body. The legacy front-end field names are accepted as aliases.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserDataRequest {
    #[serde(default, alias = "nombre")]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "respuestas")]
    pub answers: Option<Value>,
    #[serde(default, alias = "arquetipo")]
    pub archetype: Option<Value>,
    #[serde(default, alias = "imagenGenerada", alias = "generated_image")]
    pub image: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Request headers recorded with the submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestMetadata {
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    pub referer: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    pub name: String,
    pub email: String,
    pub answers: Value,
    pub archetype: Value,
    pub image: Option<String>,
    pub timestamp: String,
    pub metadata: RequestMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub success: bool,
    pub message: String,
    pub submission_id: String,
    pub data: UserRecord,
}

pub struct SubmissionService {
    store: Option<Arc<dyn ObjectStore>>,
}

impl SubmissionService {
    pub fn new(store: Option<Arc<dyn ObjectStore>>) -> Self {
        Self { store }
    }

    /// Validation failures reject the request; an inline image that cannot be
    /// uploaded fails with `StorageUploadFailed`.
    pub async fn submit(
        &self,
        request: UserDataRequest,
        metadata: RequestMetadata,
    ) -> Result<SubmissionReceipt, ApiError> {
        let name = normalize_name(request.name.as_deref().unwrap_or_default())?;
        let email = match request.email.as_deref() {
            Some(raw) => normalize_email(raw)?,
            None => return Err(ValidationError::MissingEmail.into()),
        };

        let mut record = UserRecord {
            name,
            email,
            answers: request.answers.unwrap_or_else(|| Value::Object(Default::default())),
            archetype: request.archetype.unwrap_or(Value::Null),
            image: request.image,
            timestamp: request.timestamp.unwrap_or_else(|| Utc::now().to_rfc3339()),
            metadata,
        };

        info!(
            name = %record.name,
            has_archetype = !record.archetype.is_null(),
            has_image = record.image.is_some(),
            answers = record.answers.as_object().map(|m| m.len()).unwrap_or(0),
            "user data submitted"
        );

        if let Some(data_url) = record.image.as_deref().filter(|s| s.starts_with("data:")) {
            let url = self.upload(data_url).await.map_err(|err| {
                warn!(error = %err, "submission image upload failed");
                err
            })?;
            record.image = Some(url);
        }

        Ok(SubmissionReceipt {
            success: true,
            message: "User data submitted successfully".to_string(),
            submission_id: new_submission_id(),
            data: record,
        })
    }

    async fn upload(&self, data_url: &str) -> Result<String, ApiError> {
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| ApiError::StorageUploadFailed("object storage not configured".to_string()))?;
        let image = InlineImage::from_data_url(data_url)
            .map_err(|e| ApiError::StorageUploadFailed(e.to_string()))?;
        store.upload(&image).await
    }
}
