//! The neutral response shape

use serde::{Deserialize, Serialize};

use super::common::{FinishReason, Usage};
use crate::error::FailedAttempt;

/// A completed generation, tagged with the provider that served it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub content: String,
    /// Provider id that produced `content`
    pub provider: String,
    /// Model that produced `content`
    pub model: String,
    pub usage: Usage,
    pub finish_reason: FinishReason,
    /// Candidates that failed before `provider` served the request
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallback_attempts: Vec<FailedAttempt>,
}

impl GenerationResponse {
    pub fn new(
        content: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
        usage: Usage,
        finish_reason: FinishReason,
    ) -> Self {
        Self {
            content: content.into(),
            provider: provider.into(),
            model: model.into(),
            usage,
            finish_reason,
            fallback_attempts: Vec::new(),
        }
    }

    pub fn fallback_used(&self) -> bool {
        !self.fallback_attempts.is_empty()
    }
}
