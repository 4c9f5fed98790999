//! Integration tests for configuration loading and validation

use std::collections::HashMap;
use stickerquiz::config::{ConfigIssue, ConfigLoader, ConfigSources, QuizConfig};
use stickerquiz::services::Services;
use tempfile::TempDir;

#[test]
fn test_full_config_file_loads_and_validates() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("stickerquiz.toml");

    std::fs::write(
        &config_file,
        r#"
[server]
host = "127.0.0.1"
port = 8080
static_dir = "public"
session_ttl_secs = 600

[flow]
email_capture = true
personalize_skipped_photo = true

[generation]
size = "768x768"
attempt_timeout_secs = 45

[providers.image]
api_key = "sk-image"
primary_model = "gpt-image-1"
secondary_model = ""

[providers.text]
enabled = true
temperature = 0.4

[storage]
url = "https://storage.example.com"
key = "service-key"
bucket = "quiz"

[smtp]
host = "smtp.example.com"
port = 465
user = "mailer"
pass = "secret"

[webhook]
url = "https://hooks.example.com/quiz"

[logging]
level = "debug"
format = "json"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.server.bind_address(), "127.0.0.1:8080");
    assert_eq!(config.server.session_ttl().as_secs(), 600);
    assert!(config.flow.email_capture);
    assert_eq!(config.generation.attempt_timeout().as_secs(), 45);
    assert_eq!(config.generation.samples, 1);
    assert!(config.providers.image.secondary_model.is_empty());
    assert_eq!(config.storage.bucket, "quiz");
    assert!(config.smtp.is_configured());
    // No FROM_EMAIL: the SMTP user is the sender
    assert_eq!(config.smtp.from_address(), "mailer");
    assert_eq!(config.logging.format, "json");
}

#[test]
fn test_config_file_builds_services() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("stickerquiz.toml");
    std::fs::write(
        &config_file,
        "[providers.image]\napi_key = \"sk-test\"\n\n[webhook]\nurl = \"https://hooks.example.com/x\"\n",
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    let services = Services::from_config(config).unwrap();
    assert_eq!(services.catalog.len(), 5);
    assert!(services.email.is_none());
    assert_eq!(services.runtime.session_count(), 0);
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = ConfigLoader::load_from_file(&temp_dir.path().join("absent.toml"));
    assert!(result.is_err());
}

#[test]
fn test_deployment_variables_are_honored() {
    let env = HashMap::from([
        ("PORT".to_string(), "8081".to_string()),
        ("OPENAI_API_KEY".to_string(), "sk-env".to_string()),
        ("SUPABASE_URL".to_string(), "https://db.example.com".to_string()),
        ("SUPABASE_KEY".to_string(), "anon".to_string()),
        ("FROM_EMAIL".to_string(), "stickers@example.com".to_string()),
        ("WEBHOOK_URL".to_string(), "https://hooks.example.com/y".to_string()),
    ]);
    let config = ConfigLoader::load_from_sources(&ConfigSources {
        env: Some(env),
        ..ConfigSources::default()
    })
    .unwrap();

    assert_eq!(config.server.port, 8081);
    assert_eq!(config.providers.image.api_key.as_deref(), Some("sk-env"));
    assert!(config.storage.is_configured());
    assert_eq!(config.smtp.from.as_deref(), Some("stickers@example.com"));
    assert_eq!(
        config.webhook.url.as_deref(),
        Some("https://hooks.example.com/y")
    );
    assert!(config.validate().is_ok());
}

#[test]
fn test_validation_collects_every_problem() {
    let mut config = QuizConfig::default();
    config.generation.size = "huge".to_string();
    config.storage.url = Some("https://storage.example.com".to_string());
    config.smtp.host = Some("smtp.example.com".to_string());
    config.webhook.url = Some("ftp://hooks.example.com".to_string());
    config.logging.output = "syslog".to_string();

    let issues = config.validate().unwrap_err();
    assert_eq!(issues.len(), 5);
    assert!(issues.iter().any(|i| matches!(i, ConfigIssue::Generation(_))));
    assert!(issues
        .iter()
        .any(|i| matches!(i, ConfigIssue::Collaborator(name, _) if name == "storage")));
    assert!(issues
        .iter()
        .any(|i| matches!(i, ConfigIssue::Collaborator(name, _) if name == "smtp")));
    assert!(issues
        .iter()
        .any(|i| matches!(i, ConfigIssue::Collaborator(name, _) if name == "webhook")));
    assert!(issues.iter().any(|i| matches!(i, ConfigIssue::Logging(_))));
}
