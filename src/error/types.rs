//! Core error types

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Coarse classification of a failed vendor call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    /// Missing, invalid or insufficiently privileged credentials (401/403).
    Authentication,
    /// The vendor throttled the request (429).
    RateLimit,
    /// Connection could not be established or broke mid-transfer.
    Network,
    /// The request or the stream timed out.
    Timeout,
    /// The vendor answered with something we could not interpret.
    MalformedResponse,
    /// The neutral request cannot be expressed for this vendor.
    UnsupportedParameter,
    /// The vendor rejected the request (other 4xx).
    InvalidRequest,
    /// The vendor failed on its side (5xx).
    Server,
}

impl ProviderErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::RateLimit => "rate_limit",
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::MalformedResponse => "malformed_response",
            Self::UnsupportedParameter => "unsupported_parameter",
            Self::InvalidRequest => "invalid_request",
            Self::Server => "server",
        }
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed call against one provider, normalized across vendors.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{provider} {kind} error: {message}")]
pub struct ProviderError {
    /// Provider id the failure belongs to (e.g. `groq`)
    pub provider: String,
    /// Classification used by callers and front ends
    pub kind: ProviderErrorKind,
    /// The vendor's own message when available, otherwise a transport description
    pub message: String,
    /// HTTP status code, when the failure came from an HTTP response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ProviderError {
    pub fn new(
        provider: impl Into<String>,
        kind: ProviderErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn authentication(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorKind::Authentication, message)
    }

    pub fn network(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorKind::Network, message)
    }

    pub fn malformed(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorKind::MalformedResponse, message)
    }

    pub fn unsupported(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorKind::UnsupportedParameter, message)
    }

    pub fn is_auth(&self) -> bool {
        self.kind == ProviderErrorKind::Authentication
    }

    pub fn is_rate_limit(&self) -> bool {
        self.kind == ProviderErrorKind::RateLimit
    }
}

/// One failed candidate in a fallback chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedAttempt {
    pub provider: String,
    pub error: ProviderError,
}

impl FailedAttempt {
    pub fn new(error: ProviderError) -> Self {
        Self {
            provider: error.provider.clone(),
            error,
        }
    }
}

impl fmt::Display for FailedAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [{}] {}", self.provider, self.error.kind, self.error.message)
    }
}

/// Errors reported by the facade, registry and configuration layers.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// A single provider failed and no fallback applied (direct adapter use).
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Every candidate failed; attempts are kept in candidate order.
    #[error("all providers failed: {}", format_attempts(.attempts))]
    AllProvidersExhausted { attempts: Vec<FailedAttempt> },

    /// The serving provider failed after output had already been delivered.
    #[error("stream from {provider} interrupted: {error}")]
    StreamInterrupted {
        provider: String,
        error: ProviderError,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("io error: {0}")]
    Io(String),
}

impl LlmError {
    /// Per-provider failures carried by this error, in the order they happened.
    pub fn attempts(&self) -> Vec<FailedAttempt> {
        match self {
            Self::AllProvidersExhausted { attempts } => attempts.clone(),
            Self::Provider(error) | Self::StreamInterrupted { error, .. } => {
                vec![FailedAttempt::new(error.clone())]
            }
            _ => Vec::new(),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::AllProvidersExhausted { .. })
    }
}

fn format_attempts(attempts: &[FailedAttempt]) -> String {
    if attempts.is_empty() {
        return "no provider was attempted".to_string();
    }
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_display_lists_every_attempt_in_order() {
        let err = LlmError::AllProvidersExhausted {
            attempts: vec![
                FailedAttempt::new(ProviderError::authentication("groq", "bad key")),
                FailedAttempt::new(ProviderError::network("openai", "connection refused")),
            ],
        };
        let text = err.to_string();
        let groq = text.find("groq: [authentication] bad key").expect("groq listed");
        let openai = text.find("openai: [network] connection refused").expect("openai listed");
        assert!(groq < openai);
        assert_eq!(err.attempts().len(), 2);
        assert!(err.is_exhausted());
    }

    #[test]
    fn provider_error_serializes_kind_in_snake_case() {
        let err = ProviderError::new("gemini", ProviderErrorKind::RateLimit, "quota").with_status(429);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "rate_limit");
        assert_eq!(json["status"], 429);
    }

    #[test]
    fn stream_interrupted_exposes_its_cause() {
        let err = LlmError::StreamInterrupted {
            provider: "anthropic".into(),
            error: ProviderError::network("anthropic", "reset"),
        };
        assert_eq!(err.attempts()[0].provider, "anthropic");
        assert!(!err.is_exhausted());
    }
}
