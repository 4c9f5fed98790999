//! Configuration System
//!
//! Layered configuration built with the `config` crate. Precedence, lowest to
//! highest: built-in defaults, the global file
//! (`$XDG_CONFIG_HOME/stickerquiz/config.toml`), an explicit file
//! (`--config` / `STICKERQUIZ_CONFIG`), `STICKERQUIZ__SECTION__KEY`
//! environment variables, and finally the plain deployment variables
//! (`PORT`, `OPENAI_API_KEY`, `SMTP_HOST`, ...).

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::{ConfigLoader, ConfigSources};
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub flow: FlowConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub smtp: SmtpConfig,

    #[serde(default)]
    pub webhook: WebhookConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Prebuilt front-end served at `/`
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    /// Idle sessions older than this are dropped; 0 keeps them forever
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_session_ttl_secs() -> u64 {
    60 * 60
}

fn default_body_limit_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            session_ttl_secs: default_session_ttl_secs(),
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

/// Wizard flow toggles
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowConfig {
    #[serde(default)]
    pub email_capture: bool,
    /// Add a generic personalization hint to the prompt when the photo is skipped
    #[serde(default)]
    pub personalize_skipped_photo: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_image_size")]
    pub size: String,
    #[serde(default = "default_samples")]
    pub samples: u8,
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,
}

fn default_image_size() -> String {
    "1024x1024".to_string()
}

fn default_samples() -> u8 {
    1
}

fn default_attempt_timeout_secs() -> u64 {
    crate::generation::DEFAULT_ATTEMPT_TIMEOUT_SECS
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            size: default_image_size(),
            samples: default_samples(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
        }
    }
}

impl GenerationConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub image: ImageProviderConfig,
    #[serde(default)]
    pub text: TextProviderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageProviderConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_primary_model")]
    pub primary_model: String,
    /// Text-to-image model tried after the primary; empty disables it
    #[serde(default = "default_secondary_model")]
    pub secondary_model: String,
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_primary_model() -> String {
    "gpt-image-1".to_string()
}

fn default_secondary_model() -> String {
    "dall-e-3".to_string()
}

impl Default for ImageProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            primary_model: default_primary_model(),
            secondary_model: default_secondary_model(),
        }
    }
}

/// Archetype enrichment through a chat completion API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextProviderConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Falls back to the image provider key when unset
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_text_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

fn default_text_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for TextProviderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            base_url: default_openai_base_url(),
            model: default_text_model(),
            temperature: None,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default = "default_bucket")]
    pub bucket: String,
}

fn default_bucket() -> String {
    "stickers".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: None,
            key: None,
            bucket: default_bucket(),
        }
    }
}

impl StorageConfig {
    pub fn is_configured(&self) -> bool {
        self.url.is_some() && self.key.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub pass: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
}

impl SmtpConfig {
    /// The relay needs host, port and credentials.
    pub fn is_configured(&self) -> bool {
        self.host.is_some() && self.port.is_some() && self.user.is_some() && self.pass.is_some()
    }

    /// Explicit from-address, else the SMTP user, else a no-reply placeholder.
    pub fn from_address(&self) -> String {
        self.from
            .clone()
            .or_else(|| self.user.clone())
            .unwrap_or_else(|| "no-reply@example.com".to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_webhook_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_webhook_timeout_secs() -> u64 {
    10
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_webhook_timeout_secs(),
        }
    }
}

/// Configuration problems found by [`QuizConfig::validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    Server(String),
    Generation(String),
    Provider(String, String),
    Collaborator(String, String),
    Logging(String),
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigIssue::Server(msg) => write!(f, "Server: {}", msg),
            ConfigIssue::Generation(msg) => write!(f, "Generation: {}", msg),
            ConfigIssue::Provider(name, msg) => write!(f, "Provider '{}': {}", name, msg),
            ConfigIssue::Collaborator(name, msg) => write!(f, "Collaborator '{}': {}", name, msg),
            ConfigIssue::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ConfigIssue {}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn is_image_size(value: &str) -> bool {
    match value.split_once('x') {
        Some((w, h)) => w.parse::<u32>().is_ok() && h.parse::<u32>().is_ok(),
        None => false,
    }
}

impl QuizConfig {
    /// Validate the entire configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ConfigIssue>> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigIssue::Server("port must be non-zero".to_string()));
        }
        if self.server.body_limit_bytes == 0 {
            errors.push(ConfigIssue::Server("body_limit_bytes must be non-zero".to_string()));
        }

        if self.generation.samples == 0 {
            errors.push(ConfigIssue::Generation("samples must be at least 1".to_string()));
        }
        if self.generation.attempt_timeout_secs == 0 {
            errors.push(ConfigIssue::Generation(
                "attempt_timeout_secs must be non-zero".to_string(),
            ));
        }
        if !is_image_size(&self.generation.size) {
            errors.push(ConfigIssue::Generation(format!(
                "size '{}' must look like WIDTHxHEIGHT",
                self.generation.size
            )));
        }

        let image = &self.providers.image;
        if image.primary_model.trim().is_empty() {
            errors.push(ConfigIssue::Provider(
                "image".to_string(),
                "primary_model cannot be empty".to_string(),
            ));
        }
        if !is_http_url(&image.base_url) {
            errors.push(ConfigIssue::Provider(
                "image".to_string(),
                format!("base_url '{}' must be an http(s) URL", image.base_url),
            ));
        }

        let text = &self.providers.text;
        if text.enabled {
            if text.api_key.is_none() && image.api_key.is_none() {
                errors.push(ConfigIssue::Provider(
                    "text".to_string(),
                    "enabled but no API key is configured".to_string(),
                ));
            }
            if let Some(temperature) = text.temperature {
                if !(0.0..=2.0).contains(&temperature) {
                    errors.push(ConfigIssue::Provider(
                        "text".to_string(),
                        format!("temperature {} must be between 0.0 and 2.0", temperature),
                    ));
                }
            }
        }

        match (&self.storage.url, &self.storage.key) {
            (Some(url), Some(_)) if !is_http_url(url) => errors.push(ConfigIssue::Collaborator(
                "storage".to_string(),
                format!("url '{}' must be an http(s) URL", url),
            )),
            (Some(_), None) | (None, Some(_)) => errors.push(ConfigIssue::Collaborator(
                "storage".to_string(),
                "url and key must be set together".to_string(),
            )),
            _ => {}
        }

        if self.smtp.host.is_some() && !self.smtp.is_configured() {
            errors.push(ConfigIssue::Collaborator(
                "smtp".to_string(),
                "host is set but port, user or pass is missing".to_string(),
            ));
        }

        if let Some(url) = &self.webhook.url {
            if !is_http_url(url) {
                errors.push(ConfigIssue::Collaborator(
                    "webhook".to_string(),
                    format!("url '{}' must be an http(s) URL", url),
                ));
            }
        }

        if !matches!(self.logging.format.as_str(), "json" | "text") {
            errors.push(ConfigIssue::Logging(format!(
                "format '{}' must be 'json' or 'text'",
                self.logging.format
            )));
        }
        if !matches!(self.logging.output.as_str(), "stdout" | "stderr" | "file") {
            errors.push(ConfigIssue::Logging(format!(
                "output '{}' must be 'stdout', 'stderr' or 'file'",
                self.logging.output
            )));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
