//! OpenAI Compatible Streaming Implementation
//!
//! Frames carry text in `choices[0].delta.content` and the finish reason on
//! the last content frame. With `stream_options.include_usage` the vendor
//! sends one more frame with empty `choices` and the usage, then `[DONE]`.

use eventsource_stream::Event;

use super::types::ChatCompletionChunk;
use crate::error::ProviderError;
use crate::stream::StreamItem;
use crate::types::{FinishReason, Usage};
use crate::utils::streaming::{SseEventConverter, StreamTally, parse_event, text_item};

/// Event converter for OpenAI-compatible providers
pub struct OpenAiCompatibleEventConverter {
    provider: String,
    tally: StreamTally,
}

impl OpenAiCompatibleEventConverter {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            tally: StreamTally::default(),
        }
    }
}

impl SseEventConverter for OpenAiCompatibleEventConverter {
    fn convert_event(&mut self, event: &Event) -> Result<Vec<StreamItem>, ProviderError> {
        let chunk: ChatCompletionChunk = parse_event(&self.provider, event)?;

        if let Some(usage) = chunk.usage {
            self.tally.record_usage(Usage::from(usage));
        }

        let mut items = Vec::with_capacity(1);
        if let Some(choice) = chunk.choices.into_iter().next() {
            if let Some(item) = text_item(choice.delta.content.as_deref()) {
                items.push(item);
            }
            if let Some(reason) = choice.finish_reason.as_deref() {
                self.tally.record_finish(FinishReason::from_openai(reason));
            }
        }
        Ok(items)
    }

    fn handle_stream_end(&mut self) -> StreamItem {
        self.tally.summary()
    }
}
