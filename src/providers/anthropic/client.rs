//! Anthropic Client Implementation

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::streaming::AnthropicEventConverter;
use super::transformers::{transform_request, transform_response};
use super::types::MessagesResponse;
use crate::config::ProviderConfig;
use crate::defaults;
use crate::error::ProviderError;
use crate::stream::ProviderStream;
use crate::traits::ProviderAdapter;
use crate::types::{GenerationRequest, GenerationResponse};
use crate::utils::http::{build_client, read_json, send_checked};
use crate::utils::streaming::StreamFactory;

/// Anthropic Messages API adapter
#[derive(Clone)]
pub struct AnthropicAdapter {
    provider_id: String,
    model: String,
    base_url: String,
    api_key: SecretString,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicAdapter")
            .field("provider_id", &self.provider_id)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl AnthropicAdapter {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let provider_id = config.kind.id().to_string();
        if config.api_key().trim().is_empty() {
            return Err(ProviderError::authentication(
                provider_id,
                "API key is not configured",
            ));
        }
        let http_client = build_client(&provider_id, config.timeout, config.connect_timeout)?;

        Ok(Self {
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: SecretString::from(config.api_key().trim().to_string()),
            http_client,
            provider_id,
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/messages", self.base_url)
    }

    fn build_request(
        &self,
        request: &GenerationRequest,
        stream: bool,
    ) -> Result<reqwest::RequestBuilder, ProviderError> {
        let body = transform_request(&self.provider_id, &self.model, request, stream)?;
        let url = self.messages_url();
        debug!(provider = %self.provider_id, model = %self.model, url = %url, stream, "sending messages request");

        let mut builder = self
            .http_client
            .post(url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", defaults::providers::ANTHROPIC_VERSION)
            .json(&body);
        if stream {
            builder = builder.header(reqwest::header::ACCEPT, "text/event-stream");
        }
        Ok(builder)
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn provider_id(&self) -> &str {
        &self.provider_id
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, ProviderError> {
        let builder = self.build_request(request, false)?;
        let response = send_checked(&self.provider_id, builder).await?;
        let body: MessagesResponse = read_json(&self.provider_id, response).await?;
        transform_response(&self.provider_id, &self.model, body)
    }

    async fn generate_streaming(
        &self,
        request: &GenerationRequest,
    ) -> Result<ProviderStream, ProviderError> {
        let builder = self.build_request(request, true)?;
        let converter = AnthropicEventConverter::new(self.provider_id.clone());
        StreamFactory::create_eventsource_stream(&self.provider_id, builder, converter).await
    }
}
