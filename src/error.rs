//! Error types for the sticker quiz service.

use thiserror::Error;

/// User-input validation errors. Surfaced inline; the wizard step does not advance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter your name")]
    EmptyName,

    #[error("Please enter your email address")]
    MissingEmail,

    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Unknown question: {0}")]
    UnknownQuestion(String),

    #[error("Unknown option '{option}' for question '{question}'")]
    UnknownOption { question: String, option: String },

    #[error("Intensity {0} is out of range (0-100)")]
    IntensityOutOfRange(u8),

    #[error("Question '{0}' has no answer yet")]
    MissingAnswer(String),

    #[error("Answers incomplete: {answered} of {total} questions answered")]
    IncompleteAnswers { answered: usize, total: usize },

    #[error("Question '{0}' is not a slider")]
    NotASlider(String),

    #[error("Invalid image data: {0}")]
    InvalidImage(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Service-level errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Action '{action}' is not allowed in step '{step}'")]
    InvalidTransition { step: String, action: String },

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    ProviderRateLimit(String),

    #[error("Provider model not found: {0}")]
    ProviderModelNotFound(String),

    #[error("Provider returned a malformed response: {0}")]
    MalformedResponse(String),

    #[error("Provider timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("Collaborator not configured: {0}")]
    CollaboratorNotConfigured(&'static str),

    #[error("Storage upload failed: {0}")]
    StorageUploadFailed(String),

    #[error("Email delivery failed: {0}")]
    EmailFailed(String),

    #[error("Webhook delivery failed: {0}")]
    WebhookFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ApiError {
    /// Provider-side failures, recoverable through the generation fallback chain.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            ApiError::ProviderError(_)
                | ApiError::ProviderNotConfigured(_)
                | ApiError::ProviderRequestFailed(_)
                | ApiError::ProviderAuthFailed(_)
                | ApiError::ProviderRateLimit(_)
                | ApiError::ProviderModelNotFound(_)
                | ApiError::MalformedResponse(_)
                | ApiError::ProviderTimeout(_)
        )
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
