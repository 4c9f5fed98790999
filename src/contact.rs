//! Name and email normalization shared by the wizard and the submission endpoint.

use crate::error::ValidationError;
use regex::Regex;
use std::sync::OnceLock;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|_| unreachable!("static pattern"))
    })
}

/// Trimmed, non-empty display name.
pub fn normalize_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(name.to_string())
}

/// Trimmed, lowercased, syntactically valid email address.
pub fn normalize_email(raw: &str) -> Result<String, ValidationError> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    if !email_pattern().is_match(email) {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    }
    Ok(email.to_lowercase())
}

pub fn is_valid_email(raw: &str) -> bool {
    normalize_email(raw).is_ok()
}
