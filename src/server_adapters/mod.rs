//! Server adapters: expose the facade over HTTP
//!
//! The framework-agnostic part lives here: [`SseOptions`] and the JSON
//! payloads written for each stream item. The Axum router is in [`axum`]
//! (requires the `server` feature).

use serde_json::{Value, json};

use crate::error::LlmError;
use crate::stream::{StreamChunk, StreamItem};

#[cfg(feature = "server")]
pub mod axum;

/// Options for SSE encoding.
#[derive(Debug, Clone)]
pub struct SseOptions {
    /// Emit `event: usage` for the terminal summary.
    ///
    /// Default: `true`
    pub include_usage: bool,

    /// Replace error details with `masked_error_message`.
    ///
    /// Default: `false`
    pub mask_errors: bool,

    /// Message used when `mask_errors` is `true`; "internal error" if `None`.
    pub masked_error_message: Option<String>,
}

impl Default for SseOptions {
    fn default() -> Self {
        Self {
            include_usage: true,
            mask_errors: false,
            masked_error_message: None,
        }
    }
}

impl SseOptions {
    /// Errors masked, usage kept.
    pub fn production() -> Self {
        Self {
            mask_errors: true,
            ..Default::default()
        }
    }

    fn error_message(&self, error: &LlmError) -> String {
        if self.mask_errors {
            self.masked_error_message
                .clone()
                .unwrap_or_else(|| "internal error".to_string())
        } else {
            error.to_string()
        }
    }
}

/// SSE event name and JSON payload for one stream item.
///
/// Returns `None` for items the options exclude.
pub fn sse_payload(chunk: &StreamChunk, opts: &SseOptions) -> Option<(&'static str, Value)> {
    match &chunk.item {
        StreamItem::TextFragment { text } => Some(("delta", json!({ "delta": text }))),
        StreamItem::UsageSummary {
            usage,
            finish_reason,
        } => opts.include_usage.then(|| {
            (
                "usage",
                json!({ "usage": usage, "finish_reason": finish_reason }),
            )
        }),
    }
}

/// Payload of the `start` event announcing who serves the stream.
///
/// Providers skipped before the commit are listed unless errors are masked.
pub fn start_payload(chunk: &StreamChunk, opts: &SseOptions) -> Value {
    let mut payload = json!({ "provider": chunk.provider, "model": chunk.model });
    if !opts.mask_errors && !chunk.fallback_attempts.is_empty() {
        payload["fallback_attempts"] = json!(chunk.fallback_attempts);
    }
    payload
}

/// Payload of the `error` event.
pub fn error_payload(error: &LlmError, opts: &SseOptions) -> Value {
    let mut payload = json!({ "error": opts.error_message(error) });
    if !opts.mask_errors {
        if let LlmError::StreamInterrupted { provider, .. } = error {
            payload["provider"] = json!(provider);
        }
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FailedAttempt, ProviderError};
    use crate::types::{FinishReason, Usage};

    fn chunk(item: StreamItem) -> StreamChunk {
        StreamChunk::new("groq", "llama", item)
    }

    #[test]
    fn start_lists_skipped_providers_unless_masked() {
        let first = chunk(StreamItem::text("Hi")).with_fallback_attempts(vec![
            FailedAttempt::new(ProviderError::network("openai", "refused")),
        ]);

        let data = start_payload(&first, &SseOptions::default());
        assert_eq!(data["provider"], "groq");
        assert_eq!(data["fallback_attempts"][0]["provider"], "openai");

        let masked = start_payload(&first, &SseOptions::production());
        assert!(masked.get("fallback_attempts").is_none());
    }

    #[test]
    fn delta_and_usage_payloads() {
        let opts = SseOptions::default();
        let (name, data) = sse_payload(&chunk(StreamItem::text("Hi")), &opts).unwrap();
        assert_eq!(name, "delta");
        assert_eq!(data["delta"], "Hi");

        let (name, data) = sse_payload(
            &chunk(StreamItem::summary(Usage::new(2, 3), FinishReason::Stop)),
            &opts,
        )
        .unwrap();
        assert_eq!(name, "usage");
        assert_eq!(data["usage"]["total_tokens"], 5);
        assert_eq!(data["finish_reason"], "stop");
    }

    #[test]
    fn usage_can_be_suppressed() {
        let opts = SseOptions {
            include_usage: false,
            ..Default::default()
        };
        let summary = chunk(StreamItem::summary(Usage::unknown(), FinishReason::Unknown));
        assert!(sse_payload(&summary, &opts).is_none());
    }

    #[test]
    fn masked_errors_hide_details() {
        let error = LlmError::StreamInterrupted {
            provider: "groq".into(),
            error: ProviderError::network("groq", "reset by peer"),
        };
        let masked = error_payload(&error, &SseOptions::production());
        assert_eq!(masked, json!({ "error": "internal error" }));

        let open = error_payload(&error, &SseOptions::default());
        assert_eq!(open["provider"], "groq");
        assert!(open["error"].as_str().unwrap().contains("reset by peer"));
    }
}
