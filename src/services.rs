//! Startup wiring: collaborator clients are built once from configuration and
//! shared behind trait objects.

use crate::archetype::{ArchetypeDeriver, ArchetypeEnricher};
use crate::background::TaskSpawner;
use crate::collaborators::email::SmtpSettings;
use crate::collaborators::{
    CollaboratorSink, EmailRelay, HttpWebhookClient, ObjectStore, RestObjectStore, SmtpRelay,
    SubmissionService, WebhookClient,
};
use crate::config::QuizConfig;
use crate::error::ApiError;
use crate::generation::{GenerationOrchestrator, GenerationSettings, PromptOptions};
use crate::provider::{
    build_http_client, build_provider_http_client, CompletionOptions, ImageGenerator, ImageMode,
    OpenAIClient, OpenAiImageClient, TextProviderClient,
};
use crate::quiz::QuestionCatalog;
use crate::wizard::{FlowSettings, Wizard, WizardRuntime, WizardServices};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// External collaborators, real or stubbed
#[derive(Clone)]
pub struct Collaborators {
    pub primary: Arc<dyn ImageGenerator>,
    pub secondary: Option<Arc<dyn ImageGenerator>>,
    pub text: Option<Arc<dyn TextProviderClient>>,
    pub store: Option<Arc<dyn ObjectStore>>,
    pub email: Option<Arc<dyn EmailRelay>>,
    pub webhook: Option<Arc<dyn WebhookClient>>,
}

impl Collaborators {
    /// Real clients for every collaborator the configuration enables.
    pub fn from_config(config: &QuizConfig) -> Result<Self, ApiError> {
        let http = build_provider_http_client()?;
        let image = &config.providers.image;
        if image.api_key.is_none() {
            warn!("no image API key configured; every sticker will use the placeholder");
        }

        let primary: Arc<dyn ImageGenerator> = Arc::new(OpenAiImageClient::with_client(
            http.clone(),
            image.primary_model.clone(),
            image.api_key.clone(),
            Some(image.base_url.clone()),
            ImageMode::Auto,
        ));
        let secondary = (!image.secondary_model.trim().is_empty()).then(|| {
            Arc::new(OpenAiImageClient::with_client(
                http.clone(),
                image.secondary_model.clone(),
                image.api_key.clone(),
                Some(image.base_url.clone()),
                ImageMode::TextOnly,
            )) as Arc<dyn ImageGenerator>
        });

        let text_config = &config.providers.text;
        let text = if text_config.enabled {
            text_config
                .api_key
                .clone()
                .or_else(|| image.api_key.clone())
                .map(|key| {
                    Arc::new(OpenAIClient::with_client(
                        http.clone(),
                        text_config.model.clone(),
                        key,
                        Some(text_config.base_url.clone()),
                    )) as Arc<dyn TextProviderClient>
                })
        } else {
            None
        };

        let store = match (&config.storage.url, &config.storage.key) {
            (Some(url), Some(key)) => Some(Arc::new(RestObjectStore::new(
                http.clone(),
                url,
                key.clone(),
                config.storage.bucket.clone(),
            )) as Arc<dyn ObjectStore>),
            _ => None,
        };

        let email = match (&config.smtp.host, config.smtp.port) {
            (Some(host), Some(port)) if config.smtp.is_configured() => {
                let settings = SmtpSettings {
                    host: host.clone(),
                    port,
                    username: config.smtp.user.clone(),
                    password: config.smtp.pass.clone(),
                    from: config.smtp.from_address(),
                };
                Some(Arc::new(SmtpRelay::new(&settings, http.clone())?) as Arc<dyn EmailRelay>)
            }
            _ => None,
        };

        let webhook = match &config.webhook.url {
            Some(url) => {
                let client = build_http_client(Duration::from_secs(config.webhook.timeout_secs))?;
                Some(Arc::new(HttpWebhookClient::new(client, url.clone())) as Arc<dyn WebhookClient>)
            }
            None => None,
        };

        info!(
            primary_model = %image.primary_model,
            secondary_model = %image.secondary_model,
            enrichment = text.is_some(),
            storage = store.is_some(),
            email = email.is_some(),
            webhook = webhook.is_some(),
            "collaborators configured"
        );

        Ok(Self {
            primary,
            secondary,
            text,
            store,
            email,
            webhook,
        })
    }
}

/// Everything request handlers need
#[derive(Clone)]
pub struct Services {
    pub config: Arc<QuizConfig>,
    pub catalog: Arc<QuestionCatalog>,
    pub runtime: Arc<WizardRuntime>,
    pub orchestrator: Arc<GenerationOrchestrator>,
    pub email: Option<Arc<dyn EmailRelay>>,
    pub submissions: Arc<SubmissionService>,
    pub spawner: TaskSpawner,
}

impl Services {
    pub fn from_config(config: QuizConfig) -> Result<Self, ApiError> {
        let collaborators = Collaborators::from_config(&config)?;
        Ok(Self::assemble(config, QuestionCatalog::builtin(), collaborators))
    }

    pub fn assemble(
        config: QuizConfig,
        catalog: QuestionCatalog,
        collaborators: Collaborators,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let spawner = TaskSpawner::new();

        let orchestrator = Arc::new(GenerationOrchestrator::new(
            catalog.clone(),
            collaborators.primary,
            collaborators.secondary,
            GenerationSettings {
                size: config.generation.size.clone(),
                samples: config.generation.samples,
                attempt_timeout: config.generation.attempt_timeout(),
                prompt: PromptOptions {
                    personalize_skipped_photo: config.flow.personalize_skipped_photo,
                },
            },
        ));

        let deriver = match collaborators.text {
            Some(text) => {
                let defaults = CompletionOptions::default();
                let options = CompletionOptions {
                    temperature: config.providers.text.temperature.or(defaults.temperature),
                    max_tokens: config.providers.text.max_tokens.or(defaults.max_tokens),
                };
                ArchetypeDeriver::with_enricher(
                    catalog.clone(),
                    Arc::new(ArchetypeEnricher::new(text, options)),
                )
            }
            None => ArchetypeDeriver::local(catalog.clone()),
        };

        let sink = Arc::new(CollaboratorSink::new(
            catalog.clone(),
            collaborators.store.clone(),
            collaborators.webhook,
        ));

        let wizard = Wizard::new(
            catalog.clone(),
            FlowSettings {
                email_capture: config.flow.email_capture,
            },
        );
        let runtime = Arc::new(WizardRuntime::new(
            wizard,
            WizardServices {
                deriver,
                orchestrator: orchestrator.clone(),
                sink,
                store: collaborators.store.clone(),
                email: collaborators.email.clone(),
                spawner: spawner.clone(),
            },
            config.server.session_ttl(),
        ));

        Self {
            config: Arc::new(config),
            catalog,
            runtime,
            orchestrator,
            email: collaborators.email,
            submissions: Arc::new(SubmissionService::new(collaborators.store)),
            spawner,
        }
    }
}
