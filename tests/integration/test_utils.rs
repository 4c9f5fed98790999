//! Shared stubs for integration tests
//!
//! Every external collaborator is replaced by an in-memory stub that counts
//! calls and records what it was given.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use stickerquiz::collaborators::{
    EmailMessage, EmailRelay, ObjectStore, WebhookClient, WebhookPayload,
};
use stickerquiz::config::QuizConfig;
use stickerquiz::error::ApiError;
use stickerquiz::image::{ImageRef, InlineImage};
use stickerquiz::provider::{ImageGenerator, ImageRequest};
use stickerquiz::quiz::QuestionCatalog;
use stickerquiz::services::{Collaborators, Services};

/// How a stub generator answers
#[derive(Clone)]
pub enum Behavior {
    Succeed(String),
    Fail(u16),
    Hang,
}

pub struct StubGenerator {
    pub name: &'static str,
    behavior: Behavior,
    calls: AtomicUsize,
    requests: Mutex<Vec<ImageRequest>>,
}

impl StubGenerator {
    pub fn new(name: &'static str, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            name,
            behavior,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn succeeding(name: &'static str) -> Arc<Self> {
        Self::new(name, Behavior::Succeed(format!("https://img.test/{}.png", name)))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ImageRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ImageGenerator for StubGenerator {
    async fn generate(&self, request: &ImageRequest) -> Result<ImageRef, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());
        match &self.behavior {
            Behavior::Succeed(url) => Ok(ImageRef::Url(url.clone())),
            Behavior::Fail(status) => Err(ApiError::ProviderRequestFailed(format!(
                "HTTP {}: upstream error",
                status
            ))),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(ImageRef::Url("https://img.test/late.png".to_string()))
            }
        }
    }

    fn provider_name(&self) -> &str {
        "stub"
    }

    fn model_name(&self) -> &str {
        self.name
    }
}

#[derive(Default)]
pub struct StubStore {
    pub uploads: AtomicUsize,
    pub fail: bool,
}

#[async_trait]
impl ObjectStore for StubStore {
    async fn upload(&self, image: &InlineImage) -> Result<String, ApiError> {
        let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail {
            return Err(ApiError::StorageUploadFailed("HTTP 503".to_string()));
        }
        Ok(format!("https://cdn.test/{}.{}", n, image.extension()))
    }
}

#[derive(Default)]
pub struct StubEmail {
    pub sent: Mutex<Vec<EmailMessage>>,
}

#[async_trait]
impl EmailRelay for StubEmail {
    async fn send(&self, message: EmailMessage) -> Result<(), ApiError> {
        self.sent.lock().push(message);
        Ok(())
    }
}

#[derive(Default)]
pub struct StubWebhook {
    pub delivered: Mutex<Vec<WebhookPayload>>,
}

#[async_trait]
impl WebhookClient for StubWebhook {
    async fn deliver(&self, payload: &WebhookPayload) -> Result<(), ApiError> {
        self.delivered.lock().push(payload.clone());
        Ok(())
    }
}

/// Handles to every stub behind a [`Services`]
pub struct Harness {
    pub services: Services,
    pub primary: Arc<StubGenerator>,
    pub secondary: Arc<StubGenerator>,
    pub store: Arc<StubStore>,
    pub email: Arc<StubEmail>,
    pub webhook: Arc<StubWebhook>,
}

impl Harness {
    pub fn new(config: QuizConfig, primary: Behavior, secondary: Behavior) -> Self {
        let primary = StubGenerator::new("primary", primary);
        let secondary = StubGenerator::new("secondary", secondary);
        let store = Arc::new(StubStore::default());
        let email = Arc::new(StubEmail::default());
        let webhook = Arc::new(StubWebhook::default());

        let services = Services::assemble(
            config,
            QuestionCatalog::builtin(),
            Collaborators {
                primary: primary.clone(),
                secondary: Some(secondary.clone()),
                text: None,
                store: Some(store.clone()),
                email: Some(email.clone()),
                webhook: Some(webhook.clone()),
            },
        );

        Self {
            services,
            primary,
            secondary,
            store,
            email,
            webhook,
        }
    }

    /// Primary succeeds with a URL; default configuration.
    pub fn happy() -> Self {
        Self::new(
            QuizConfig::default(),
            Behavior::Succeed("https://img.test/primary.png".to_string()),
            Behavior::Succeed("https://img.test/secondary.png".to_string()),
        )
    }
}

/// A valid answer for each built-in question, in catalog order.
pub fn builtin_answers() -> Vec<(&'static str, Option<u8>)> {
    vec![
        ("fully_data_driven", None),
        ("high", Some(90)),
        ("early_adopter", None),
        ("networker", None),
        ("innovation_product", None),
    ]
}

/// Small PNG-typed data URL for photo events.
pub fn photo_data_url() -> String {
    InlineImage::new("image/png", vec![0x89, b'P', b'N', b'G', 1, 2, 3]).to_data_url()
}
