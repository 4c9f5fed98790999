//! Model Provider Abstraction
//!
//! Clients for the OpenAI-compatible services the quiz depends on: an image
//! generation API (primary and secondary modes) and an optional chat
//! completion API used to enrich archetypes. Clients are built once at startup
//! and shared behind trait objects so tests can substitute stubs.

use crate::error::ApiError;
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub mod image;
pub mod text;

pub use image::{ImageGenerator, ImageMode, ImageRequest, OpenAiImageClient};
pub use text::{
    ChatMessage, CompletionOptions, CompletionResponse, MessageRole, OpenAIClient,
    TextProviderClient, TokenUsage,
};

// Helper function to map HTTP errors to ApiError
pub(crate) fn map_http_error(error: reqwest::Error) -> ApiError {
    if let Some(status) = error.status() {
        status_error(status, &error.to_string())
    } else if error.is_timeout() {
        ApiError::ProviderRequestFailed(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        ApiError::ProviderRequestFailed(format!("Connection error: {}", error))
    } else {
        ApiError::ProviderError(format!("HTTP error: {}", error))
    }
}

/// Map a non-success status and its body text to ApiError
pub(crate) fn status_error(status: StatusCode, body: &str) -> ApiError {
    match status.as_u16() {
        401 | 403 => ApiError::ProviderAuthFailed(format!("Authentication failed: {}", body)),
        429 => ApiError::ProviderRateLimit(format!("Rate limit exceeded: {}", body)),
        404 => ApiError::ProviderModelNotFound(format!("Model not found: {}", body)),
        _ => ApiError::ProviderRequestFailed(format!(
            "Request failed with status {}: {}",
            status,
            truncate(body, 300)
        )),
    }
}

/// Pull the provider's own error message out of an OpenAI-style error body.
pub(crate) fn provider_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}…", cut)
    }
}

const PROVIDER_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const PROVIDER_HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub fn build_provider_http_client() -> Result<Client, ApiError> {
    build_http_client(PROVIDER_HTTP_REQUEST_TIMEOUT)
}

/// Shared HTTP client with an explicit request timeout.
pub fn build_http_client(request_timeout: Duration) -> Result<Client, ApiError> {
    Client::builder()
        .connect_timeout(PROVIDER_HTTP_CONNECT_TIMEOUT)
        .timeout(request_timeout)
        .build()
        .map_err(|e| ApiError::ProviderError(format!("Failed to create HTTP client: {}", e)))
}
