//! Type Conversions
//!
//! Transport and serialization errors carry no provider identity, so the
//! provider-facing conversions are constructors taking the provider id rather
//! than `From` impls.

use super::types::{LlmError, ProviderError, ProviderErrorKind};

impl ProviderError {
    /// Classify a `reqwest` failure for `provider`.
    pub fn from_reqwest(provider: &str, err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ProviderErrorKind::Timeout
        } else if err.is_decode() {
            ProviderErrorKind::MalformedResponse
        } else {
            ProviderErrorKind::Network
        };
        let mut error = Self::new(provider, kind, err.to_string());
        if let Some(status) = err.status() {
            error.status = Some(status.as_u16());
        }
        error
    }

    /// A response body that did not match the vendor's documented shape.
    pub fn from_json(provider: &str, err: &serde_json::Error) -> Self {
        Self::malformed(provider, format!("failed to parse response: {err}"))
    }
}

impl From<std::io::Error> for LlmError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<toml::de::Error> for LlmError {
    fn from(err: toml::de::Error) -> Self {
        Self::Configuration(format!("invalid config file: {err}"))
    }
}
