//! HTTP error classification shared by every adapter.
//!
//! All supported vendors wrap failures in `{"error": {"message": ...}}`
//! (Anthropic adds a top-level `"type": "error"`, Gemini a `status` string),
//! so one extractor covers them; the raw body is the fallback.

use super::types::{ProviderError, ProviderErrorKind};
use serde_json::Value;

/// Map an HTTP status code to an error kind.
pub fn kind_for_status(status: u16) -> ProviderErrorKind {
    match status {
        401 | 403 => ProviderErrorKind::Authentication,
        429 => ProviderErrorKind::RateLimit,
        408 | 504 => ProviderErrorKind::Timeout,
        500..=599 => ProviderErrorKind::Server,
        _ => ProviderErrorKind::InvalidRequest,
    }
}

/// Pull the human-readable message out of a vendor error body.
pub fn extract_error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    let error = json.get("error")?;
    match error {
        Value::String(message) => Some(message.clone()),
        Value::Object(_) => {
            let message = error.get("message").and_then(Value::as_str)?;
            let code = error
                .get("type")
                .or_else(|| error.get("status"))
                .or_else(|| error.get("code"))
                .and_then(Value::as_str);
            Some(match code {
                Some(code) if !code.is_empty() => format!("{message} ({code})"),
                _ => message.to_string(),
            })
        }
        _ => None,
    }
}

/// Build a [`ProviderError`] for a non-success HTTP response.
pub fn classify_http_error(provider: &str, status: u16, body: &str) -> ProviderError {
    let message = extract_error_message(body).unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            format!("HTTP {status}")
        } else {
            trimmed.to_string()
        }
    });
    ProviderError::new(provider, kind_for_status(status), message).with_status(status)
}
