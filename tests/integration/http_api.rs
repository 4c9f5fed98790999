//! Integration tests for the HTTP surface, driven through the router in-process

use crate::integration::test_utils::{
    builtin_answers, photo_data_url, Behavior, Harness, StubGenerator, StubStore,
};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use stickerquiz::config::QuizConfig;
use stickerquiz::quiz::QuestionCatalog;
use stickerquiz::server::build_router;
use stickerquiz::services::{Collaborators, Services};
use tower::ServiceExt;

async fn call(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .header("user-agent", "integration-test")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health_and_questions() {
    let router = build_router(Harness::happy().services);

    let (status, body) = call(&router, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = call(&router, Method::GET, "/api/questions", None).await;
    assert_eq!(status, StatusCode::OK);
    let questions = body.as_array().unwrap();
    assert_eq!(questions.len(), 5);
    assert_eq!(questions[1]["id"], "risk_appetite");
}

#[tokio::test]
async fn test_session_lifecycle_over_http() {
    let harness = Harness::happy();
    let router = build_router(harness.services.clone());

    let (status, body) = call(&router, Method::POST, "/api/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["step"]["name"], "welcome");
    let id = body["id"].as_str().unwrap().to_string();
    let events = format!("/api/sessions/{}/events", id);

    let (status, body) = call(&router, Method::POST, &events, Some(json!({"type": "start"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"]["name"], "name_input");

    // Empty name: 422 with the message and the unchanged session
    let (status, body) = call(
        &router,
        Method::POST,
        &events,
        Some(json!({"type": "submit_name", "name": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Please enter your name");
    assert_eq!(body["session"]["step"]["name"], "name_input");
    assert_eq!(body["session"]["error"], "Please enter your name");

    call(
        &router,
        Method::POST,
        &events,
        Some(json!({"type": "submit_name", "name": "Ada"})),
    )
    .await;
    for (option_id, intensity) in builtin_answers() {
        let (status, _) = call(
            &router,
            Method::POST,
            &events,
            Some(json!({"type": "select_option", "option_id": option_id, "intensity": intensity})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        call(&router, Method::POST, &events, Some(json!({"type": "next"}))).await;
    }

    let (status, body) = call(&router, Method::POST, &events, Some(json!({"type": "skip_photo"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"]["name"], "generating");

    harness.services.runtime.settle().await;
    let (status, body) = call(&router, Method::GET, &format!("/api/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"]["name"], "result");
    assert_eq!(body["result"]["path"], "primary");
    assert_eq!(body["result"]["image"], "https://img.test/primary.png");

    // Share is fine on Result, but not twice
    let (status, body) = call(&router, Method::POST, &events, Some(json!({"type": "share"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"]["name"], "thank_you");
    let (status, _) = call(&router, Method::POST, &events, Some(json!({"type": "share"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call(&router, Method::DELETE, &format!("/api/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&router, Method::GET, &format!("/api/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_generate_image_endpoint() {
    let harness = Harness::new(
        QuizConfig::default(),
        Behavior::Fail(502),
        Behavior::Succeed("https://img.test/secondary.png".to_string()),
    );
    let router = build_router(harness.services.clone());

    let (status, _) = call(&router, Method::POST, "/api/generate-image", Some(json!({"prompt": " "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(harness.primary.calls(), 0);

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/generate-image",
        Some(json!({"prompt": "a robot sticker", "selfieDataUrl": photo_data_url()})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["path"], "secondary");
    assert_eq!(body["image"], "https://img.test/secondary.png");
    assert!(body["error"].as_str().unwrap().contains("502"));
    assert!(harness.primary.requests()[0].reference.is_some());
}

#[tokio::test]
async fn test_send_sticker_email_validates_fields() {
    let harness = Harness::happy();
    let router = build_router(harness.services.clone());

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/send-sticker-email",
        Some(json!({"subject": "Your sticker"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("to"));

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/send-sticker-email",
        Some(json!({
            "to": "ada@example.com",
            "subject": "Visionary Sticker for Ada",
            "text": "Bold ideas",
            "imageUrl": "https://img.test/primary.png"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let sent = harness.email.sent.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Visionary Sticker for Ada");
}

#[tokio::test]
async fn test_submit_user_data_accepts_legacy_fields() {
    let harness = Harness::happy();
    let router = build_router(harness.services.clone());

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/submit-user-data",
        Some(json!({
            "nombre": " Ada ",
            "email": "Ada@Example.com",
            "respuestas": {"decision_making": "fully_data_driven"},
            "arquetipo": {"name": "Visionary"},
            "imagenGenerada": photo_data_url()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["submission_id"].as_str().unwrap().starts_with("sub_"));
    assert_eq!(body["data"]["name"], "Ada");
    assert_eq!(body["data"]["email"], "ada@example.com");
    assert_eq!(body["data"]["image"], "https://cdn.test/1.png");
    assert_eq!(body["data"]["metadata"]["user_agent"], "integration-test");

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/submit-user-data",
        Some(json!({"nombre": "Ada", "email": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid email"));
}

#[tokio::test]
async fn test_submit_user_data_upload_failure_is_bad_gateway() {
    let services = Services::assemble(
        QuizConfig::default(),
        QuestionCatalog::builtin(),
        Collaborators {
            primary: StubGenerator::succeeding("primary"),
            secondary: None,
            text: None,
            store: Some(Arc::new(StubStore {
                fail: true,
                ..StubStore::default()
            })),
            email: None,
            webhook: None,
        },
    );
    let router = build_router(services);

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/submit-user-data",
        Some(json!({
            "nombre": "Ada",
            "email": "ada@example.com",
            "imagenGenerada": photo_data_url()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to upload image");
    assert!(body["details"].as_str().unwrap().contains("503"));

    // No SMTP relay configured
    let (status, _) = call(
        &router,
        Method::POST,
        "/api/send-sticker-email",
        Some(json!({"to": "ada@example.com", "subject": "Hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

/// A data URL whose JSON body lands at roughly `target` bytes.
fn large_photo_body(target: usize) -> Vec<u8> {
    let payload = "A".repeat(target / 4 * 4);
    json!({
        "prompt": "a robot sticker",
        "selfieDataUrl": format!("data:image/png;base64,{}", payload)
    })
    .to_string()
    .into_bytes()
}

async fn post_raw(router: &Router, uri: &str, body: Vec<u8>) -> StatusCode {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    router.clone().oneshot(request).await.unwrap().status()
}

#[tokio::test]
async fn test_photo_bodies_above_two_megabytes_are_accepted() {
    let harness = Harness::happy();
    let router = build_router(harness.services.clone());

    let body = large_photo_body(3 * 1024 * 1024);
    assert!(body.len() > 2 * 1024 * 1024);
    assert!(body.len() < harness.services.config.server.body_limit_bytes);

    let status = post_raw(&router, "/api/generate-image", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(harness.primary.calls(), 1);
    assert!(harness.primary.requests()[0].reference.is_some());
}

#[tokio::test]
async fn test_bodies_over_configured_limit_are_rejected() {
    let mut config = QuizConfig::default();
    config.server.body_limit_bytes = 4 * 1024 * 1024;
    let harness = Harness::new(
        config,
        Behavior::Succeed("https://img.test/primary.png".to_string()),
        Behavior::Succeed("https://img.test/secondary.png".to_string()),
    );
    let router = build_router(harness.services.clone());

    let status = post_raw(&router, "/api/generate-image", large_photo_body(5 * 1024 * 1024)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(harness.primary.calls(), 0);

    let status = post_raw(&router, "/api/generate-image", large_photo_body(3 * 1024 * 1024)).await;
    assert_eq!(status, StatusCode::OK);
}
