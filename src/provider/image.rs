//! Image generation client (OpenAI-compatible images API).

use super::{build_provider_http_client, map_http_error, provider_error_message, status_error};
use crate::error::ApiError;
use crate::image::{ImageRef, InlineImage};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Request to an image generation collaborator
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub prompt: String,
    /// Reference image (user selfie); switches capable providers to edit mode
    pub reference: Option<InlineImage>,
    pub size: String,
    pub samples: u8,
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Produce one image for the request. Any failure is an attempt failure.
    async fn generate(&self, request: &ImageRequest) -> Result<ImageRef, ApiError>;

    fn provider_name(&self) -> &str;

    fn model_name(&self) -> &str;
}

/// Which sub-operation of the images API a client uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageMode {
    /// `edits` when a reference image is present, `generations` otherwise
    Auto,
    /// Always `generations`, ignoring any reference image
    TextOnly,
}

#[derive(Serialize)]
struct GenerationsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    n: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<&'static str>,
}

#[derive(Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
    url: Option<String>,
}

pub struct OpenAiImageClient {
    client: Client,
    model: String,
    api_key: Option<String>,
    base_url: String,
    mode: ImageMode,
}

impl OpenAiImageClient {
    pub fn new(
        model: String,
        api_key: Option<String>,
        base_url: Option<String>,
        mode: ImageMode,
    ) -> Result<Self, ApiError> {
        let client = build_provider_http_client()?;
        Ok(Self::with_client(client, model, api_key, base_url, mode))
    }

    pub fn with_client(
        client: Client,
        model: String,
        api_key: Option<String>,
        base_url: Option<String>,
        mode: ImageMode,
    ) -> Self {
        let base_url = base_url
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
            .trim_end_matches('/')
            .to_string();
        Self {
            client,
            model,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url,
            mode,
        }
    }

    pub fn mode(&self) -> ImageMode {
        self.mode
    }

    fn api_key(&self) -> Result<&str, ApiError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ApiError::ProviderNotConfigured("image generation API key".to_string()))
    }

    // dall-e models return URLs unless asked otherwise; gpt-image models always return base64
    fn response_format(&self) -> Option<&'static str> {
        self.model.starts_with("dall-e").then_some("b64_json")
    }

    async fn generations(&self, request: &ImageRequest) -> Result<ImageRef, ApiError> {
        let body = GenerationsRequest {
            model: &self.model,
            prompt: &request.prompt,
            size: &request.size,
            n: request.samples.max(1),
            response_format: self.response_format(),
        };
        let url = format!("{}/images/generations", self.base_url);
        debug!(model = %self.model, "calling images/generations");
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key()?)
            .json(&body)
            .send()
            .await
            .map_err(map_http_error)?;
        parse_images_response(response).await
    }

    async fn edits(
        &self,
        request: &ImageRequest,
        reference: &InlineImage,
    ) -> Result<ImageRef, ApiError> {
        let file_name = format!("selfie.{}", reference.extension());
        let image_part = Part::bytes(reference.bytes.clone())
            .file_name(file_name)
            .mime_str(&reference.mime)
            .map_err(|e| ApiError::ProviderError(format!("Invalid reference image type: {}", e)))?;
        let mut form = Form::new()
            .part("image", image_part)
            .text("model", self.model.clone())
            .text("prompt", request.prompt.clone())
            .text("size", request.size.clone())
            .text("n", request.samples.max(1).to_string());
        if let Some(format) = self.response_format() {
            form = form.text("response_format", format);
        }

        let url = format!("{}/images/edits", self.base_url);
        debug!(model = %self.model, reference = ?reference, "calling images/edits");
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key()?)
            .multipart(form)
            .send()
            .await
            .map_err(map_http_error)?;
        parse_images_response(response).await
    }
}

async fn parse_images_response(response: reqwest::Response) -> Result<ImageRef, ApiError> {
    let status = response.status();
    let text = response.text().await.map_err(map_http_error)?;
    if !status.is_success() {
        return Err(status_error(status, &provider_error_message(&text)));
    }
    image_from_body(&text)
}

/// Extract the first image from an images API response body.
pub(crate) fn image_from_body(body: &str) -> Result<ImageRef, ApiError> {
    let parsed: ImagesResponse = serde_json::from_str(body)
        .map_err(|e| ApiError::MalformedResponse(format!("Failed to parse images response: {}", e)))?;
    let datum = parsed
        .data
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::MalformedResponse("images response has no data".to_string()))?;
    if let Some(b64) = datum.b64_json.filter(|s| !s.is_empty()) {
        let image = InlineImage::from_base64("image/png", &b64)
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;
        return Ok(ImageRef::Inline(image));
    }
    if let Some(url) = datum.url.filter(|s| !s.is_empty()) {
        return Ok(ImageRef::Url(url));
    }
    Err(ApiError::MalformedResponse(
        "images response has neither b64_json nor url".to_string(),
    ))
}

#[async_trait]
impl ImageGenerator for OpenAiImageClient {
    async fn generate(&self, request: &ImageRequest) -> Result<ImageRef, ApiError> {
        match (&self.mode, &request.reference) {
            (ImageMode::Auto, Some(reference)) => self.edits(request, reference).await,
            _ => self.generations(request).await,
        }
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
