//! Environment sources: `STICKERQUIZ__SECTION__KEY` variables, then the plain
//! deployment variable names.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;
use std::collections::HashMap;

pub const PREFIX: &str = "STICKERQUIZ";

/// Plain variable names and the config keys they set.
pub const LEGACY_VARS: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("OPENAI_API_KEY", "providers.image.api_key"),
    ("FROM_EMAIL", "smtp.from"),
    ("SMTP_HOST", "smtp.host"),
    ("SMTP_PORT", "smtp.port"),
    ("SMTP_USER", "smtp.user"),
    ("SMTP_PASS", "smtp.pass"),
    ("SUPABASE_URL", "storage.url"),
    ("SUPABASE_KEY", "storage.key"),
    ("WEBHOOK_URL", "webhook.url"),
];

/// Add prefixed and plain environment variables.
///
/// `vars` replaces the process environment when given (tests).
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    vars: Option<&HashMap<String, String>>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let prefixed = Environment::with_prefix(PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .source(vars.cloned().map(|v| v.into_iter().collect()));
    let mut builder = builder.add_source(prefixed);

    for (var, key) in LEGACY_VARS {
        let value = match vars {
            Some(vars) => vars.get(*var).cloned(),
            None => std::env::var(var).ok(),
        };
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            builder = builder.set_override(*key, value)?;
        }
    }
    Ok(builder)
}
