//! Anthropic streaming implementation using eventsource-stream
//!
//! `message_start` carries input usage, `content_block_delta` the text,
//! `message_delta` the stop reason and output usage, and `message_stop`
//! closes the stream. `ping` frames are ignored.

use eventsource_stream::Event;

use super::types::{StreamErrorBody, StreamEvent};
use crate::error::{ProviderError, ProviderErrorKind};
use crate::stream::StreamItem;
use crate::types::{FinishReason, Usage};
use crate::utils::streaming::{SseEventConverter, StreamTally, parse_event, text_item};

/// Anthropic event converter
pub struct AnthropicEventConverter {
    provider: String,
    tally: StreamTally,
}

impl AnthropicEventConverter {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            tally: StreamTally::default(),
        }
    }

    fn stream_error(&self, body: Option<StreamErrorBody>) -> ProviderError {
        let (error_type, message) = body
            .map(|b| (b.error_type, b.message))
            .unwrap_or((None, None));
        let kind = match error_type.as_deref() {
            Some("authentication_error" | "permission_error") => ProviderErrorKind::Authentication,
            Some("rate_limit_error") => ProviderErrorKind::RateLimit,
            Some("invalid_request_error") => ProviderErrorKind::InvalidRequest,
            _ => ProviderErrorKind::Server,
        };
        let message = match (message, error_type) {
            (Some(m), Some(t)) => format!("{m} ({t})"),
            (Some(m), None) => m,
            (None, Some(t)) => t,
            (None, None) => "stream error".to_string(),
        };
        ProviderError::new(self.provider.clone(), kind, message)
    }
}

impl SseEventConverter for AnthropicEventConverter {
    fn convert_event(&mut self, event: &Event) -> Result<Vec<StreamItem>, ProviderError> {
        let frame: StreamEvent = parse_event(&self.provider, event)?;

        match frame.event_type.as_str() {
            "message_start" => {
                if let Some(usage) = frame.message.and_then(|m| m.usage) {
                    self.tally.record_usage(Usage::from(usage));
                }
                Ok(Vec::new())
            }
            "content_block_delta" => Ok(frame
                .delta
                .and_then(|d| text_item(d.text.as_deref()))
                .into_iter()
                .collect()),
            "message_delta" => {
                if let Some(reason) = frame.delta.and_then(|d| d.stop_reason) {
                    self.tally.record_finish(FinishReason::from_anthropic(&reason));
                }
                if let Some(usage) = frame.usage {
                    self.tally.record_usage(Usage::from(usage));
                }
                Ok(Vec::new())
            }
            "error" => Err(self.stream_error(frame.error)),
            _ => Ok(Vec::new()),
        }
    }

    fn is_end_event(&self, event: &Event) -> bool {
        event.event == "message_stop" || event.data.contains(r#""type":"message_stop""#)
    }

    fn handle_stream_end(&mut self) -> StreamItem {
        self.tally.summary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: &str, data: &str) -> Event {
        Event {
            event: name.to_string(),
            data: data.to_string(),
            id: String::new(),
            retry: None,
        }
    }

    #[test]
    fn full_event_sequence() {
        let mut converter = AnthropicEventConverter::new("anthropic");
        let frames = [
            event(
                "message_start",
                r#"{"type":"message_start","message":{"id":"msg_1","usage":{"input_tokens":12,"output_tokens":1}}}"#,
            ),
            event("ping", r#"{"type":"ping"}"#),
            event(
                "content_block_start",
                r#"{"type":"content_block_start","index":0,"content_block":{"type":"text","text":""}}"#,
            ),
            event(
                "content_block_delta",
                r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hello"}}"#,
            ),
            event(
                "content_block_delta",
                r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":" world"}}"#,
            ),
            event(
                "message_delta",
                r#"{"type":"message_delta","delta":{"stop_reason":"end_turn"},"usage":{"output_tokens":6}}"#,
            ),
        ];

        let mut text = String::new();
        for frame in &frames {
            for item in converter.convert_event(frame).unwrap() {
                text.push_str(item.as_text().unwrap());
            }
        }
        assert_eq!(text, "Hello world");
        assert!(converter.is_end_event(&event("message_stop", r#"{"type":"message_stop"}"#)));
        assert_eq!(
            converter.handle_stream_end(),
            StreamItem::summary(Usage::new(12, 6), FinishReason::Stop)
        );
    }

    #[test]
    fn overloaded_error_frame() {
        let mut converter = AnthropicEventConverter::new("anthropic");
        let err = converter
            .convert_event(&event(
                "error",
                r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#,
            ))
            .unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Server);
        assert_eq!(err.message, "Overloaded (overloaded_error)");
    }

    #[test]
    fn done_marker_is_not_an_anthropic_end_event() {
        let converter = AnthropicEventConverter::new("anthropic");
        assert!(!converter.is_end_event(&event("message", "[DONE]")));
    }
}
