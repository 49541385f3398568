//! Unified facade
//!
//! [`UnifiedLlm`] hides provider selection and fallback behind two calls.
//! Candidates are tried strictly one after another, once each.
//!
//! Streaming falls back only while nothing has been handed to the caller.
//! The facade commits to a candidate as soon as that candidate produced its
//! first item; a failure after that point ends the stream with
//! [`LlmError::StreamInterrupted`] instead of switching providers.

use futures::StreamExt;
use std::sync::Arc;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::config::Settings;
use crate::error::{FailedAttempt, LlmError, ProviderError};
use crate::registry::ProviderRegistry;
use crate::stream::{ChatStream, ProviderStream, StreamChunk, StreamItem};
use crate::traits::ProviderAdapter;
use crate::types::{FinishReason, GenerationRequest, GenerationResponse, Usage};

/// Single entry point over the configured providers.
#[derive(Debug, Clone)]
pub struct UnifiedLlm {
    registry: Arc<ProviderRegistry>,
}

impl UnifiedLlm {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Build the registry from `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self, LlmError> {
        Ok(Self::new(ProviderRegistry::from_settings(settings)?))
    }

    /// Read `.env` and the environment, then build the registry.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_settings(&Settings::from_env()?)
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Generate a complete response, falling back in candidate order.
    ///
    /// The response names the provider that served it and lists the
    /// candidates that failed before it in `fallback_attempts`. When every
    /// candidate fails the error carries all attempts in order.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        preferred: Option<&str>,
    ) -> Result<GenerationResponse, LlmError> {
        request.validate()?;
        let candidates = self.registry.candidates(preferred);
        let span = info_span!(
            "generate",
            request_id = %Uuid::new_v4(),
            preferred = preferred.unwrap_or("")
        );

        async move {
            let mut attempts = Vec::new();
            for adapter in candidates {
                info!(provider = %adapter.provider_id(), model = %adapter.model(), "attempting provider");
                match adapter.generate(request).await {
                    Ok(mut response) => {
                        if !attempts.is_empty() {
                            info!(
                                provider = %response.provider,
                                failed = attempts.len(),
                                "served by fallback provider"
                            );
                        }
                        response.fallback_attempts = attempts;
                        return Ok(response);
                    }
                    Err(e) => {
                        warn!(provider = %adapter.provider_id(), error = %e, "provider failed");
                        attempts.push(FailedAttempt::new(e));
                    }
                }
            }
            Err(exhausted(attempts))
        }
        .instrument(span)
        .await
    }

    /// Open a streamed generation, falling back until one candidate commits.
    ///
    /// Returns once a candidate has produced its first item (or finished
    /// without any, in which case the stream holds a single unknown-usage
    /// summary). Every item of the returned stream comes from that one
    /// candidate, and the first chunk carries the candidates skipped before
    /// it. A later failure is yielded once as [`LlmError::StreamInterrupted`]
    /// and the stream ends.
    pub async fn generate_streaming(
        &self,
        request: &GenerationRequest,
        preferred: Option<&str>,
    ) -> Result<ChatStream, LlmError> {
        request.validate()?;
        let candidates = self.registry.candidates(preferred);
        let request_id = Uuid::new_v4();
        let span = info_span!(
            "generate_streaming",
            request_id = %request_id,
            preferred = preferred.unwrap_or("")
        );

        async move {
            let mut attempts = Vec::new();
            for adapter in candidates {
                info!(provider = %adapter.provider_id(), model = %adapter.model(), "attempting provider");
                match open_committed(adapter.as_ref(), request).await {
                    Ok((first, rest)) => {
                        if !attempts.is_empty() {
                            info!(
                                provider = %adapter.provider_id(),
                                failed = attempts.len(),
                                "stream served by fallback provider"
                            );
                        }
                        return Ok(committed_stream(
                            adapter.provider_id().to_string(),
                            adapter.model().to_string(),
                            request_id,
                            attempts,
                            first,
                            rest,
                        ));
                    }
                    Err(e) => {
                        warn!(provider = %adapter.provider_id(), error = %e, "provider failed before streaming");
                        attempts.push(FailedAttempt::new(e));
                    }
                }
            }
            Err(exhausted(attempts))
        }
        .instrument(span)
        .await
    }
}

fn exhausted(attempts: Vec<FailedAttempt>) -> LlmError {
    error!(attempts = attempts.len(), "all providers exhausted");
    LlmError::AllProvidersExhausted { attempts }
}

/// Open `adapter`'s stream and pull its first item.
///
/// `Ok((None, _))` means the stream finished without producing anything.
async fn open_committed(
    adapter: &dyn ProviderAdapter,
    request: &GenerationRequest,
) -> Result<(Option<StreamItem>, ProviderStream), ProviderError> {
    let mut stream = adapter.generate_streaming(request).await?;
    match stream.next().await {
        Some(Ok(item)) => Ok((Some(item), stream)),
        Some(Err(e)) => Err(e),
        None => Ok((None, stream)),
    }
}

fn committed_stream(
    provider: String,
    model: String,
    request_id: Uuid,
    attempts: Vec<FailedAttempt>,
    first: Option<StreamItem>,
    mut rest: ProviderStream,
) -> ChatStream {
    let stream = async_stream::stream! {
        let first = first
            .unwrap_or_else(|| StreamItem::summary(Usage::unknown(), FinishReason::Unknown));
        yield Ok(StreamChunk::new(provider.clone(), model.clone(), first)
            .with_fallback_attempts(attempts));

        while let Some(next) = rest.next().await {
            match next {
                Ok(item) => yield Ok(StreamChunk::new(provider.clone(), model.clone(), item)),
                Err(error) => {
                    warn!(
                        request_id = %request_id,
                        provider = %provider,
                        error = %error,
                        "stream interrupted after output was delivered"
                    );
                    yield Err(LlmError::StreamInterrupted { provider: provider.clone(), error });
                    return;
                }
            }
        }
    };
    Box::pin(stream)
}
