//! Gemini streaming implementation
//!
//! With `alt=sse` every frame is a complete `GenerateContentResponse` holding
//! the next slice of text. Usage metadata is cumulative. There is no end
//! marker; the stream finishes at EOF.

use eventsource_stream::Event;

use super::transformers::{candidate_text, finish_reason};
use super::types::GenerateContentResponse;
use crate::error::ProviderError;
use crate::stream::StreamItem;
use crate::types::Usage;
use crate::utils::streaming::{SseEventConverter, StreamTally, parse_event, text_item};

/// Gemini event converter
pub struct GeminiEventConverter {
    provider: String,
    tally: StreamTally,
}

impl GeminiEventConverter {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            tally: StreamTally::default(),
        }
    }
}

impl SseEventConverter for GeminiEventConverter {
    fn convert_event(&mut self, event: &Event) -> Result<Vec<StreamItem>, ProviderError> {
        let frame: GenerateContentResponse = parse_event(&self.provider, event)?;

        if let Some(usage) = frame.usage_metadata {
            self.tally.record_usage(Usage::from(usage));
        }
        if let Some(reason) = finish_reason(&frame) {
            self.tally.record_finish(reason);
        }
        Ok(text_item(candidate_text(&frame).as_deref())
            .into_iter()
            .collect())
    }

    fn is_end_event(&self, _event: &Event) -> bool {
        false
    }

    fn requires_end_event(&self) -> bool {
        false
    }

    fn handle_stream_end(&mut self) -> StreamItem {
        self.tally.summary()
    }
}
