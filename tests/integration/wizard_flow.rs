//! Integration tests for the wizard runtime
//!
//! Tests cover:
//! - Full walk from Welcome to ThankYou with background generation
//! - Validation failures that must not reach any collaborator
//! - Restart while a generation is in flight
//! - Email and submission side effects

use crate::integration::test_utils::{builtin_answers, photo_data_url, Behavior, Harness};
use std::sync::atomic::Ordering;
use stickerquiz::config::QuizConfig;
use stickerquiz::error::{ApiError, ValidationError};
use stickerquiz::generation::GenerationPath;
use stickerquiz::image::ImageRef;
use stickerquiz::wizard::{SessionView, Step, WizardEvent, WizardRuntime};

async fn send(runtime: &WizardRuntime, id: &str, event: WizardEvent) -> SessionView {
    runtime.dispatch(id, event).await.unwrap()
}

/// Start a session and walk it up to the step after the last question.
async fn answer_everything(runtime: &WizardRuntime, name: &str) -> String {
    let id = runtime.create_session().id;
    send(runtime, &id, WizardEvent::Start).await;
    send(
        runtime,
        &id,
        WizardEvent::SubmitName {
            name: name.to_string(),
        },
    )
    .await;
    for (option_id, intensity) in builtin_answers() {
        send(
            runtime,
            &id,
            WizardEvent::SelectOption {
                option_id: option_id.to_string(),
                intensity,
            },
        )
        .await;
        send(runtime, &id, WizardEvent::Next).await;
    }
    id
}

#[tokio::test]
async fn test_full_flow_reaches_thank_you() {
    let harness = Harness::happy();
    let runtime = harness.services.runtime.clone();

    let id = answer_everything(&runtime, "  Ada ").await;
    let view = runtime.view(&id).unwrap();
    assert_eq!(view.step, Step::Photo);
    assert_eq!(view.name.as_deref(), Some("Ada"));
    assert_eq!(view.answers.len(), 5);

    let view = send(&runtime, &id, WizardEvent::SkipPhoto).await;
    assert_eq!(view.step, Step::Generating);

    runtime.settle().await;
    let view = runtime.view(&id).unwrap();
    assert_eq!(view.step, Step::Result);
    let result = view.result.expect("result recorded");
    assert_eq!(result.path, GenerationPath::Primary);
    assert_eq!(
        result.image,
        ImageRef::Url("https://img.test/primary.png".to_string())
    );
    assert!(result.error.is_none());
    assert_eq!(harness.primary.calls(), 1);
    assert_eq!(harness.secondary.calls(), 0);

    // Entering Result submits once with action "result"
    {
        let delivered = harness.webhook.delivered.lock();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].action, "result");
        assert_eq!(delivered[0].name, "Ada");
        assert_eq!(
            delivered[0].image_url.as_deref(),
            Some("https://img.test/primary.png")
        );
    }
    // Remote URLs are not re-uploaded
    assert_eq!(harness.store.uploads.load(Ordering::SeqCst), 0);

    let view = send(&runtime, &id, WizardEvent::Share).await;
    assert_eq!(view.step, Step::ThankYou);
    runtime.settle().await;
    let delivered = harness.webhook.delivered.lock();
    assert_eq!(delivered.len(), 2);
    assert_eq!(delivered[1].action, "share");
}

#[tokio::test]
async fn test_invalid_email_blocks_progress_without_side_effects() {
    let mut config = QuizConfig::default();
    config.flow.email_capture = true;
    let harness = Harness::new(
        config,
        Behavior::Succeed("https://img.test/p.png".to_string()),
        Behavior::Fail(500),
    );
    let runtime = harness.services.runtime.clone();

    let id = answer_everything(&runtime, "Ada").await;
    assert_eq!(runtime.view(&id).unwrap().step, Step::EmailCapture);

    let err = runtime
        .dispatch(
            &id,
            WizardEvent::SubmitEmail {
                email: "not-an-email".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Validation(ValidationError::InvalidEmail(_))
    ));

    let view = runtime.view(&id).unwrap();
    assert_eq!(view.step, Step::EmailCapture);
    assert!(view.error.as_deref().unwrap().contains("Invalid email"));

    runtime.settle().await;
    assert_eq!(harness.primary.calls(), 0);
    assert!(harness.webhook.delivered.lock().is_empty());
    assert!(harness.email.sent.lock().is_empty());

    // A valid address clears the message and moves on, normalized
    let view = send(
        &runtime,
        &id,
        WizardEvent::SubmitEmail {
            email: " Ada@Example.COM ".to_string(),
        },
    )
    .await;
    assert_eq!(view.step, Step::Photo);
    assert!(view.error.is_none());
    assert_eq!(view.email.as_deref(), Some("ada@example.com"));
}

#[tokio::test(start_paused = true)]
async fn test_restart_discards_in_flight_generation() {
    let mut config = QuizConfig::default();
    config.generation.attempt_timeout_secs = 5;
    let harness = Harness::new(
        config,
        Behavior::Hang,
        Behavior::Succeed("https://img.test/late-secondary.png".to_string()),
    );
    let runtime = harness.services.runtime.clone();

    let id = answer_everything(&runtime, "Ada").await;
    let view = send(&runtime, &id, WizardEvent::SkipPhoto).await;
    assert_eq!(view.step, Step::Generating);

    let view = send(&runtime, &id, WizardEvent::Restart).await;
    assert_eq!(view.step, Step::Welcome);
    assert!(view.name.is_none());
    assert!(view.answers.is_empty());

    // The chain still finishes (timeout, then secondary) but its result is dropped
    runtime.settle().await;
    assert_eq!(harness.secondary.calls(), 1);
    let view = runtime.view(&id).unwrap();
    assert_eq!(view.step, Step::Welcome);
    assert!(view.result.is_none());
    assert!(harness.webhook.delivered.lock().is_empty());
}

#[tokio::test]
async fn test_exhausted_chain_produces_placeholder_and_uploads_it() {
    let harness = Harness::new(
        QuizConfig::default(),
        Behavior::Fail(502),
        Behavior::Fail(500),
    );
    let runtime = harness.services.runtime.clone();

    let id = answer_everything(&runtime, "Ada").await;
    send(&runtime, &id, WizardEvent::SkipPhoto).await;
    runtime.settle().await;

    let view = runtime.view(&id).unwrap();
    assert_eq!(view.step, Step::Result);
    let result = view.result.unwrap();
    assert_eq!(result.path, GenerationPath::Fallback);
    assert!(result.error.as_deref().unwrap().contains("500"));
    let inline = result.image.as_inline().expect("placeholder is inline");
    assert_eq!(inline.mime, "image/svg+xml");

    // Inline images are stored once, before the webhook sees them
    assert_eq!(harness.store.uploads.load(Ordering::SeqCst), 1);
    assert_eq!(result.image_url.as_deref(), Some("https://cdn.test/1.svg"));
    {
        let delivered = harness.webhook.delivered.lock();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].image_url.as_deref(), Some("https://cdn.test/1.svg"));
    }

    // Print reuses the stored copy
    send(&runtime, &id, WizardEvent::Print).await;
    runtime.settle().await;
    assert_eq!(harness.store.uploads.load(Ordering::SeqCst), 1);
    let delivered = harness.webhook.delivered.lock();
    assert_eq!(delivered.len(), 2);
    assert_eq!(delivered[1].action, "print");
    assert_eq!(delivered[1].image_url.as_deref(), Some("https://cdn.test/1.svg"));
}

#[tokio::test]
async fn test_photo_is_forwarded_to_provider() {
    let harness = Harness::happy();
    let runtime = harness.services.runtime.clone();

    let id = answer_everything(&runtime, "Ada").await;
    send(
        &runtime,
        &id,
        WizardEvent::ConfirmPhoto {
            photo: photo_data_url(),
        },
    )
    .await;
    runtime.settle().await;

    let requests = harness.primary.requests();
    assert_eq!(requests.len(), 1);
    let reference = requests[0].reference.as_ref().expect("photo forwarded");
    assert_eq!(reference.mime, "image/png");
    assert!(requests[0].prompt.contains("reference photo"));
}

#[tokio::test]
async fn test_email_result_uses_archetype_subject() {
    let harness = Harness::happy();
    let runtime = harness.services.runtime.clone();

    let id = answer_everything(&runtime, "Ada").await;
    send(&runtime, &id, WizardEvent::SkipPhoto).await;
    runtime.settle().await;
    let archetype = runtime.view(&id).unwrap().result.unwrap().archetype;

    let view = send(
        &runtime,
        &id,
        WizardEvent::EmailResult {
            to: Some("Friend@Example.com".to_string()),
        },
    )
    .await;
    assert_eq!(view.step, Step::Result);
    runtime.settle().await;

    let sent = harness.email.sent.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "friend@example.com");
    assert_eq!(sent[0].subject, format!("{} Sticker for Ada", archetype.name));
    assert_eq!(sent[0].text, archetype.value_line);
    assert!(sent[0].attachment.is_some());
}

#[tokio::test]
async fn test_email_result_without_address_is_rejected() {
    let harness = Harness::happy();
    let runtime = harness.services.runtime.clone();

    let id = answer_everything(&runtime, "Ada").await;
    send(&runtime, &id, WizardEvent::SkipPhoto).await;
    runtime.settle().await;

    let err = runtime
        .dispatch(&id, WizardEvent::EmailResult { to: None })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Validation(ValidationError::MissingEmail)
    ));
    runtime.settle().await;
    assert!(harness.email.sent.lock().is_empty());
}

#[tokio::test]
async fn test_navigation_and_rejected_events() {
    let harness = Harness::happy();
    let runtime = harness.services.runtime.clone();
    let id = runtime.create_session().id;

    // Share is not accepted on Welcome and changes nothing
    let err = runtime.dispatch(&id, WizardEvent::Share).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidTransition { .. }));
    assert_eq!(runtime.view(&id).unwrap().step, Step::Welcome);

    send(&runtime, &id, WizardEvent::Start).await;
    let err = runtime
        .dispatch(
            &id,
            WizardEvent::SubmitName {
                name: "   ".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(ValidationError::EmptyName)));

    send(
        &runtime,
        &id,
        WizardEvent::SubmitName {
            name: "Ada".to_string(),
        },
    )
    .await;
    // First question is not a slider
    let err = runtime
        .dispatch(&id, WizardEvent::AdjustSlider { value: 10 })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Validation(ValidationError::NotASlider(_))
    ));
    assert_eq!(runtime.view(&id).unwrap().step, Step::Questions { index: 0 });

    send(
        &runtime,
        &id,
        WizardEvent::SelectOption {
            option_id: "balanced_mix".to_string(),
            intensity: None,
        },
    )
    .await;
    let view = send(&runtime, &id, WizardEvent::Next).await;
    assert_eq!(view.step, Step::Questions { index: 1 });
    assert_eq!(view.question.as_ref().unwrap().id, "risk_appetite");

    // Slider values map onto the nearest stop
    let view = send(&runtime, &id, WizardEvent::AdjustSlider { value: 30 }).await;
    let answer = view.answers.get("risk_appetite").unwrap();
    assert_eq!(answer.option_id, "medium");
    assert_eq!(answer.intensity, Some(30));

    let view = send(&runtime, &id, WizardEvent::Previous).await;
    assert_eq!(view.step, Step::Questions { index: 0 });
    // Answers survive backward navigation
    assert_eq!(view.answers.len(), 2);

    let err = runtime.view("sess-missing").unwrap_err();
    assert!(matches!(err, ApiError::SessionNotFound(_)));
}

#[tokio::test]
async fn test_connectivity_banner_is_independent_of_step() {
    let harness = Harness::happy();
    let runtime = harness.services.runtime.clone();
    let id = runtime.create_session().id;

    let view = send(
        &runtime,
        &id,
        WizardEvent::ConnectivityLost {
            message: "You appear to be offline".to_string(),
        },
    )
    .await;
    assert_eq!(view.step, Step::Welcome);
    assert_eq!(view.banner.as_deref(), Some("You appear to be offline"));

    let view = send(&runtime, &id, WizardEvent::DismissError).await;
    assert!(view.banner.is_none());
}

#[tokio::test]
async fn test_discarded_session_is_gone() {
    let harness = Harness::happy();
    let runtime = harness.services.runtime.clone();
    let id = runtime.create_session().id;
    assert_eq!(runtime.session_count(), 1);

    runtime.discard(&id).unwrap();
    assert_eq!(runtime.session_count(), 0);
    assert!(matches!(
        runtime.dispatch(&id, WizardEvent::Start).await,
        Err(ApiError::SessionNotFound(_))
    ));
}
