//! Generation orchestrator: primary provider, then secondary, then placeholder.
//!
//! Both entry points are total. Each provider attempt is bounded by the
//! configured timeout; a timed-out attempt counts as a failure and the chain
//! moves on.

use super::placeholder::placeholder_image;
use super::prompt::{build_prompt, PromptOptions};
use super::result::{GenerationPath, GenerationResult};
use crate::archetype::Archetype;
use crate::error::ApiError;
use crate::image::{ImageRef, InlineImage};
use crate::provider::{ImageGenerator, ImageRequest};
use crate::quiz::{AnswerSet, QuestionCatalog};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Per-attempt bound used when nothing is configured
pub const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 90;

#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub size: String,
    pub samples: u8,
    pub attempt_timeout: Duration,
    pub prompt: PromptOptions,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            size: "1024x1024".to_string(),
            samples: 1,
            attempt_timeout: Duration::from_secs(DEFAULT_ATTEMPT_TIMEOUT_SECS),
            prompt: PromptOptions::default(),
        }
    }
}

/// Image plus the chain link that produced it
#[derive(Debug, Clone)]
pub struct ChainOutcome {
    pub image: ImageRef,
    pub path: GenerationPath,
    pub error: Option<String>,
}

pub struct GenerationOrchestrator {
    catalog: Arc<QuestionCatalog>,
    primary: Arc<dyn ImageGenerator>,
    secondary: Option<Arc<dyn ImageGenerator>>,
    settings: GenerationSettings,
}

impl GenerationOrchestrator {
    pub fn new(
        catalog: Arc<QuestionCatalog>,
        primary: Arc<dyn ImageGenerator>,
        secondary: Option<Arc<dyn ImageGenerator>>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            catalog,
            primary,
            secondary,
            settings,
        }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Build the prompt for an archetype and run the fallback chain.
    pub async fn generate(
        &self,
        archetype: Archetype,
        answers: &AnswerSet,
        photo: Option<InlineImage>,
    ) -> GenerationResult {
        let prompt = build_prompt(
            &archetype,
            &self.catalog,
            Some(answers),
            photo.is_some(),
            self.settings.prompt,
        );
        let outcome = self.run_chain(&prompt, photo, &archetype.name).await;
        GenerationResult {
            image: outcome.image,
            archetype,
            prompt,
            path: outcome.path,
            error: outcome.error,
            image_url: None,
        }
    }

    /// Run the chain for an already-built prompt. `label` is drawn on the placeholder.
    pub async fn run_chain(
        &self,
        prompt: &str,
        photo: Option<InlineImage>,
        label: &str,
    ) -> ChainOutcome {
        let request = ImageRequest {
            prompt: prompt.to_string(),
            reference: photo,
            size: self.settings.size.clone(),
            samples: self.settings.samples.max(1),
        };

        let mut last_error = match self.attempt(self.primary.as_ref(), &request).await {
            Ok(image) => {
                return ChainOutcome {
                    image,
                    path: GenerationPath::Primary,
                    error: None,
                }
            }
            Err(err) => err,
        };

        if let Some(secondary) = &self.secondary {
            match self.attempt(secondary.as_ref(), &request).await {
                Ok(image) => {
                    return ChainOutcome {
                        image,
                        path: GenerationPath::Secondary,
                        error: Some(last_error.to_string()),
                    }
                }
                Err(err) => last_error = err,
            }
        }

        warn!(error = %last_error, "image providers exhausted, using placeholder");
        ChainOutcome {
            image: placeholder_image(label),
            path: GenerationPath::Fallback,
            error: Some(last_error.to_string()),
        }
    }

    async fn attempt(
        &self,
        generator: &dyn ImageGenerator,
        request: &ImageRequest,
    ) -> Result<ImageRef, ApiError> {
        let started = Instant::now();
        debug!(
            provider = generator.provider_name(),
            model = generator.model_name(),
            with_reference = request.reference.is_some(),
            "image attempt started"
        );
        let result = match tokio::time::timeout(
            self.settings.attempt_timeout,
            generator.generate(request),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ApiError::ProviderTimeout(
                self.settings.attempt_timeout.as_secs(),
            )),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(image) => info!(
                provider = generator.provider_name(),
                model = generator.model_name(),
                elapsed_ms,
                image = %image.describe(),
                "image attempt succeeded"
            ),
            Err(err) => warn!(
                provider = generator.provider_name(),
                model = generator.model_name(),
                elapsed_ms,
                error = %err,
                "image attempt failed"
            ),
        }
        result
    }
}
