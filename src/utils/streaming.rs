//! Common Streaming Utilities
//!
//! SSE parsing is delegated to `eventsource-stream`, which handles line
//! buffering and UTF-8 boundaries; each vendor supplies an
//! [`SseEventConverter`] that turns its frames into [`StreamItem`]s.

use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures_util::StreamExt;
use tracing::{trace, warn};

use crate::error::ProviderError;
use crate::stream::{ProviderStream, StreamItem};
use crate::types::{FinishReason, Usage};
use crate::utils::http::send_checked;

/// Vendor-specific conversion of SSE events.
///
/// Converters are owned by a single stream, so they keep their state in
/// plain fields.
pub trait SseEventConverter: Send + 'static {
    /// Convert one SSE event into zero or more items. An `Err` ends the stream.
    fn convert_event(&mut self, event: &Event) -> Result<Vec<StreamItem>, ProviderError>;

    /// Whether this event is the vendor's completion signal.
    fn is_end_event(&self, event: &Event) -> bool {
        event.data.trim() == "[DONE]"
    }

    /// Whether EOF before [`is_end_event`](Self::is_end_event) matched is a
    /// truncated stream. Vendors whose streams simply end at EOF return `false`.
    fn requires_end_event(&self) -> bool {
        true
    }

    /// Terminal summary emitted once the vendor stream is over.
    fn handle_stream_end(&mut self) -> StreamItem;
}

/// Usage and finish reason gathered while a stream runs.
#[derive(Debug, Default)]
pub struct StreamTally {
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

impl StreamTally {
    pub fn record_usage(&mut self, usage: Usage) {
        let mut merged = usage;
        merged.merge(&self.usage);
        self.usage = merged;
    }

    pub fn record_finish(&mut self, reason: FinishReason) {
        self.finish_reason = Some(reason);
    }

    pub fn summary(&mut self) -> StreamItem {
        StreamItem::summary(
            self.usage,
            self.finish_reason.take().unwrap_or(FinishReason::Unknown),
        )
    }
}

/// Stream factory for creating provider streams
pub struct StreamFactory;

impl StreamFactory {
    /// Send `request_builder` and expose the SSE response as a [`ProviderStream`].
    ///
    /// Connection failures and error statuses are returned before any item
    /// exists. After that, a transport or parse failure is yielded once and
    /// the stream ends. The end event yields the converter's terminal summary,
    /// as does EOF when the converter does not require an end event; otherwise
    /// EOF is a network error.
    pub async fn create_eventsource_stream<C>(
        provider: &str,
        request_builder: reqwest::RequestBuilder,
        converter: C,
    ) -> Result<ProviderStream, ProviderError>
    where
        C: SseEventConverter,
    {
        let response = send_checked(provider, request_builder).await?;
        let provider = provider.to_string();
        let mut events = response.bytes_stream().eventsource();

        let stream = async_stream::stream! {
            let mut converter = converter;
            let mut completed = false;
            while let Some(event) = events.next().await {
                let event = match event {
                    Ok(event) => event,
                    Err(e) => {
                        yield Err(map_stream_error(&provider, e));
                        return;
                    }
                };
                trace!(provider = %provider, event = %event.event, data = %event.data, "sse frame");

                if converter.is_end_event(&event) {
                    completed = true;
                    break;
                }
                if event.data.trim().is_empty() {
                    continue;
                }
                match converter.convert_event(&event) {
                    Ok(items) => {
                        for item in items {
                            yield Ok(item);
                        }
                    }
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
            if !completed && converter.requires_end_event() {
                warn!(provider = %provider, "stream ended before completion signal");
                yield Err(ProviderError::network(&provider, "stream ended before completion"));
                return;
            }
            yield Ok(converter.handle_stream_end());
        };

        Ok(Box::pin(stream))
    }
}

fn map_stream_error(provider: &str, err: EventStreamError<reqwest::Error>) -> ProviderError {
    match err {
        EventStreamError::Transport(e) => ProviderError::from_reqwest(provider, &e),
        other => ProviderError::malformed(provider, format!("SSE parsing error: {other}")),
    }
}

/// Parse an SSE data payload as JSON.
pub fn parse_event<T: serde::de::DeserializeOwned>(
    provider: &str,
    event: &Event,
) -> Result<T, ProviderError> {
    serde_json::from_str(&event.data).map_err(|e| {
        ProviderError::malformed(provider, format!("failed to parse {provider} event: {e}"))
    })
}

/// Wrap non-empty text as a fragment.
pub fn text_item(text: Option<&str>) -> Option<StreamItem> {
    text.filter(|t| !t.is_empty()).map(StreamItem::text)
}
