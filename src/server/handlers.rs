use crate::collaborators::{EmailMessage, RequestMetadata, SubmissionReceipt, UserDataRequest};
use crate::error::{ApiError, ValidationError};
use crate::generation::GenerationPath;
use crate::image::{ImageRef, InlineImage};
use crate::quiz::Question;
use crate::services::Services;
use crate::wizard::{SessionView, WizardEvent};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

pub async fn questions(State(services): State<Services>) -> Json<Vec<Question>> {
    Json(services.catalog.questions().to_vec())
}

pub async fn create_session(State(services): State<Services>) -> (StatusCode, Json<SessionView>) {
    (StatusCode::CREATED, Json(services.runtime.create_session()))
}

pub async fn get_session(
    State(services): State<Services>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(services.runtime.view(&id)?))
}

pub async fn delete_session(
    State(services): State<Services>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    services.runtime.discard(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Validation failures answer 422 with the session (carrying `error`) so the
/// client can render the message inline.
pub async fn session_event(
    State(services): State<Services>,
    Path(id): Path<String>,
    Json(event): Json<WizardEvent>,
) -> Result<Response, ApiError> {
    match services.runtime.dispatch(&id, event).await {
        Ok(view) => Ok(Json(view).into_response()),
        Err(ApiError::Validation(err)) => {
            let view = services.runtime.view(&id)?;
            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": err.to_string(), "session": view })),
            )
                .into_response())
        }
        Err(err) => Err(err),
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateImageRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default, alias = "selfieDataUrl")]
    pub selfie_data_url: Option<String>,
    /// Text drawn on the placeholder if every provider fails
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateImageResponse {
    pub ok: bool,
    pub image: ImageRef,
    pub path: GenerationPath,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn generate_image(
    State(services): State<Services>,
    Json(request): Json<GenerateImageRequest>,
) -> Result<Json<GenerateImageResponse>, ApiError> {
    if request.prompt.trim().is_empty() {
        return Err(ValidationError::MissingField("prompt").into());
    }
    let photo = request
        .selfie_data_url
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(InlineImage::from_data_url)
        .transpose()?;
    let label = request.label.as_deref().unwrap_or("Sticker");
    let outcome = services
        .orchestrator
        .run_chain(&request.prompt, photo, label)
        .await;
    Ok(Json(GenerateImageResponse {
        ok: outcome.path != GenerationPath::Fallback,
        image: outcome.image,
        path: outcome.path,
        error: outcome.error,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, alias = "imageUrl")]
    pub image_url: Option<String>,
}

pub async fn send_sticker_email(
    State(services): State<Services>,
    Json(request): Json<SendEmailRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let relay = services
        .email
        .clone()
        .ok_or(ApiError::CollaboratorNotConfigured("smtp"))?;
    let to = request
        .to
        .filter(|t| !t.trim().is_empty())
        .ok_or(ValidationError::MissingField("to"))?;
    let subject = request
        .subject
        .filter(|s| !s.trim().is_empty())
        .ok_or(ValidationError::MissingField("subject"))?;
    let attachment = request
        .image_url
        .filter(|u| !u.is_empty())
        .map(ImageRef::try_from)
        .transpose()?;

    relay
        .send(EmailMessage {
            to,
            subject,
            text: request.text.unwrap_or_default(),
            attachment,
        })
        .await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn submit_user_data(
    State(services): State<Services>,
    headers: HeaderMap,
    Json(request): Json<UserDataRequest>,
) -> Result<Json<SubmissionReceipt>, ApiError> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let metadata = RequestMetadata {
        user_agent: header("user-agent"),
        ip: header("x-forwarded-for"),
        referer: header("referer"),
    };
    Ok(Json(services.submissions.submit(request, metadata).await?))
}
