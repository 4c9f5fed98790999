//! Best-effort submission of a finished session.

use super::storage::ObjectStore;
use super::webhook::{WebhookClient, WebhookPayload};
use crate::archetype::Archetype;
use crate::error::ApiError;
use crate::image::ImageRef;
use crate::quiz::{AnswerSet, QuestionCatalog};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What caused the submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitAction {
    Result,
    Share,
    Print,
}

impl SubmitAction {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmitAction::Result => "result",
            SubmitAction::Share => "share",
            SubmitAction::Print => "print",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionSummary {
    pub session_id: String,
    pub name: String,
    pub email: Option<String>,
    pub answers: AnswerSet,
    pub archetype: Archetype,
    pub image: ImageRef,
    /// Already-stored copy of an inline `image`
    pub image_url: Option<String>,
    pub action: SubmitAction,
    pub timestamp: DateTime<Utc>,
}

#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn submit(&self, summary: SubmissionSummary) -> Result<(), ApiError>;
}

/// Uploads inline images not stored yet, then notifies the webhook. Either collaborator may be absent.
pub struct CollaboratorSink {
    catalog: Arc<QuestionCatalog>,
    store: Option<Arc<dyn ObjectStore>>,
    webhook: Option<Arc<dyn WebhookClient>>,
}

impl CollaboratorSink {
    pub fn new(
        catalog: Arc<QuestionCatalog>,
        store: Option<Arc<dyn ObjectStore>>,
        webhook: Option<Arc<dyn WebhookClient>>,
    ) -> Self {
        Self {
            catalog,
            store,
            webhook,
        }
    }
}

#[async_trait]
impl SubmissionSink for CollaboratorSink {
    async fn submit(&self, summary: SubmissionSummary) -> Result<(), ApiError> {
        let image_url = match (&summary.image, &self.store) {
            (ImageRef::Url(url), _) => Some(url.clone()),
            (ImageRef::Inline(_), _) if summary.image_url.is_some() => summary.image_url.clone(),
            (ImageRef::Inline(inline), Some(store)) => match store.upload(inline).await {
                Ok(url) => Some(url),
                Err(err) => {
                    warn!(session = %summary.session_id, error = %err, "image upload failed");
                    None
                }
            },
            // Inline data is never forwarded to the webhook.
            (ImageRef::Inline(_), None) => None,
        };

        let Some(webhook) = &self.webhook else {
            debug!(session = %summary.session_id, "no webhook configured, submission recorded locally only");
            return Ok(());
        };
        let payload = WebhookPayload::from_summary(&summary, &self.catalog, image_url);
        webhook.deliver(&payload).await?;
        info!(
            session = %summary.session_id,
            action = summary.action.as_str(),
            archetype = %summary.archetype.name,
            "submission delivered"
        );
        Ok(())
    }
}
