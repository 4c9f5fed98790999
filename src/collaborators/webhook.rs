//! Workflow-automation webhook.

use super::sink::SubmissionSummary;
use crate::error::ApiError;
use crate::provider::truncate;
use crate::quiz::QuestionCatalog;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Label pairs beyond this count are dropped from the payload.
pub const MAX_WEBHOOK_PAIRS: usize = 10;

/// Fixed-shape document posted to the webhook.
///
/// Question/answer labels are flattened into `question_1`/`answer_1` and so on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookPayload {
    pub email: String,
    pub name: String,
    pub timestamp: String,
    pub image_url: Option<String>,
    pub archetype: String,
    pub action: String,
    #[serde(flatten)]
    pub pairs: Map<String, Value>,
}

impl WebhookPayload {
    /// `image_url` is the already-resolved public URL, if any.
    pub fn from_summary(
        summary: &SubmissionSummary,
        catalog: &QuestionCatalog,
        image_url: Option<String>,
    ) -> Self {
        let mut pairs = Map::new();
        for (i, answer) in summary
            .answers
            .labeled(catalog)
            .into_iter()
            .take(MAX_WEBHOOK_PAIRS)
            .enumerate()
        {
            pairs.insert(
                format!("question_{}", i + 1),
                Value::String(answer.question.prompt.clone()),
            );
            pairs.insert(
                format!("answer_{}", i + 1),
                Value::String(answer.option.label.clone()),
            );
        }
        Self {
            email: summary.email.clone().unwrap_or_default(),
            name: summary.name.clone(),
            timestamp: summary.timestamp.to_rfc3339(),
            image_url,
            archetype: summary.archetype.name.clone(),
            action: summary.action.as_str().to_string(),
            pairs,
        }
    }
}

#[async_trait]
pub trait WebhookClient: Send + Sync {
    async fn deliver(&self, payload: &WebhookPayload) -> Result<(), ApiError>;
}

pub struct HttpWebhookClient {
    client: Client,
    url: String,
}

impl HttpWebhookClient {
    pub fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl WebhookClient for HttpWebhookClient {
    async fn deliver(&self, payload: &WebhookPayload) -> Result<(), ApiError> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| ApiError::WebhookFailed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::WebhookFailed(format!(
                "{}: {}",
                status,
                truncate(&body, 200)
            )));
        }
        debug!(status = %status, action = %payload.action, "webhook delivered");
        Ok(())
    }
}
