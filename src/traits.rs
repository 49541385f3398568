//! The capability every vendor adapter implements

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ProviderError;
use crate::stream::ProviderStream;
use crate::types::{GenerationRequest, GenerationResponse};

/// One vendor behind the neutral request/response model.
///
/// Implementations hold only connection-level state (their HTTP client) and
/// must be safe for concurrent independent calls. Every failure is reported
/// as a [`ProviderError`]; vendor and transport error types never escape.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Stable provider id (`openai`, `groq`, ...)
    fn provider_id(&self) -> &str;

    /// Model requests are sent to
    fn model(&self) -> &str;

    /// One blocking round trip.
    async fn generate(&self, request: &GenerationRequest)
    -> Result<GenerationResponse, ProviderError>;

    /// Open a streamed generation.
    ///
    /// Errors detected before any byte of output (bad parameters, connection
    /// failure, non-success status) are returned here; later failures surface
    /// as an `Err` item and end the stream. No retries happen inside.
    async fn generate_streaming(
        &self,
        request: &GenerationRequest,
    ) -> Result<ProviderStream, ProviderError>;
}

#[async_trait]
impl ProviderAdapter for Arc<dyn ProviderAdapter> {
    fn provider_id(&self) -> &str {
        (**self).provider_id()
    }

    fn model(&self) -> &str {
        (**self).model()
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, ProviderError> {
        (**self).generate(request).await
    }

    async fn generate_streaming(
        &self,
        request: &GenerationRequest,
    ) -> Result<ProviderStream, ProviderError> {
        (**self).generate_streaming(request).await
    }
}
