//! Streaming item types
//!
//! Adapters produce a [`ProviderStream`] of [`StreamItem`]s; the facade turns
//! it into a [`ChatStream`] of [`StreamChunk`]s tagged with the serving
//! provider. Usage is not a side channel: it arrives as the terminal
//! [`StreamItem::UsageSummary`].

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::error::{FailedAttempt, LlmError, ProviderError};
use crate::types::{FinishReason, GenerationResponse, Usage};

/// One item of a provider stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamItem {
    /// Incremental, non-empty text
    TextFragment { text: String },
    /// Terminal item of a completed stream
    UsageSummary {
        usage: Usage,
        finish_reason: FinishReason,
    },
}

impl StreamItem {
    pub fn text(text: impl Into<String>) -> Self {
        Self::TextFragment { text: text.into() }
    }

    pub fn summary(usage: Usage, finish_reason: FinishReason) -> Self {
        Self::UsageSummary {
            usage,
            finish_reason,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::TextFragment { text } => Some(text),
            Self::UsageSummary { .. } => None,
        }
    }
}

/// Lazy, finite, non-restartable stream produced by one adapter.
///
/// Dropping it releases the underlying HTTP response.
pub type ProviderStream = Pin<Box<dyn Stream<Item = Result<StreamItem, ProviderError>> + Send>>;

/// A stream item tagged with the provider and model serving it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamChunk {
    pub provider: String,
    pub model: String,
    pub item: StreamItem,
    /// Candidates that failed before `provider` committed; set on the first
    /// chunk only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallback_attempts: Vec<FailedAttempt>,
}

impl StreamChunk {
    pub fn new(provider: impl Into<String>, model: impl Into<String>, item: StreamItem) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            item,
            fallback_attempts: Vec::new(),
        }
    }

    pub fn with_fallback_attempts(mut self, attempts: Vec<FailedAttempt>) -> Self {
        self.fallback_attempts = attempts;
        self
    }
}

/// Stream returned by the facade.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, LlmError>> + Send>>;

/// Drain a [`ChatStream`] into a [`GenerationResponse`].
///
/// Fragments are concatenated in order; usage and finish reason come from the
/// terminal summary (`Usage::unknown()` / `FinishReason::Unknown` if the
/// stream carried none). Fallback attempts carried by the first chunk are
/// kept on the response. The first error ends collection.
pub async fn collect_stream(mut stream: ChatStream) -> Result<GenerationResponse, LlmError> {
    let mut content = String::new();
    let mut provider = String::new();
    let mut model = String::new();
    let mut usage = Usage::unknown();
    let mut finish_reason = FinishReason::Unknown;
    let mut attempts = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        attempts.extend(chunk.fallback_attempts);
        provider = chunk.provider;
        model = chunk.model;
        match chunk.item {
            StreamItem::TextFragment { text } => content.push_str(&text),
            StreamItem::UsageSummary {
                usage: reported,
                finish_reason: reason,
            } => {
                usage = reported;
                finish_reason = reason;
            }
        }
    }

    let mut response = GenerationResponse::new(content, provider, model, usage, finish_reason);
    response.fallback_attempts = attempts;
    Ok(response)
}
