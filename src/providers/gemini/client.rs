//! Gemini Client Implementation

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::streaming::GeminiEventConverter;
use super::transformers::{transform_request, transform_response};
use super::types::GenerateContentResponse;
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::stream::ProviderStream;
use crate::traits::ProviderAdapter;
use crate::types::{GenerationRequest, GenerationResponse};
use crate::utils::http::{build_client, read_json, send_checked};
use crate::utils::streaming::StreamFactory;

/// Gemini `generateContent` adapter
#[derive(Clone)]
pub struct GeminiAdapter {
    provider_id: String,
    model: String,
    base_url: String,
    api_key: SecretString,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for GeminiAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiAdapter")
            .field("provider_id", &self.provider_id)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiAdapter {
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

    fn endpoint(&self, stream: bool) -> String {
        if stream {
            format!(
                "{}/models/{}:streamGenerateContent?alt=sse",
                self.base_url, self.model
            )
        } else {
            format!("{}/models/{}:generateContent", self.base_url, self.model)
        }
    }

    fn build_request(
        &self,
        request: &GenerationRequest,
        stream: bool,
    ) -> Result<reqwest::RequestBuilder, ProviderError> {
        let body = transform_request(&self.provider_id, request)?;
        let url = self.endpoint(stream);
        debug!(provider = %self.provider_id, model = %self.model, url = %url, stream, "sending generateContent");

        Ok(self
            .http_client
            .post(url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body))
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
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
        let body: GenerateContentResponse = read_json(&self.provider_id, response).await?;
        transform_response(&self.provider_id, &self.model, body)
    }

    async fn generate_streaming(
        &self,
        request: &GenerationRequest,
    ) -> Result<ProviderStream, ProviderError> {
        let builder = self.build_request(request, true)?;
        let converter = GeminiEventConverter::new(self.provider_id.clone());
        StreamFactory::create_eventsource_stream(&self.provider_id, builder, converter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;

    #[test]
    fn endpoints_follow_model() {
        let config = ProviderConfig::new(ProviderKind::Gemini, Some("g-key".into()))
            .with_model("gemini-1.5-pro");
        let adapter = GeminiAdapter::new(&config).unwrap();
        assert_eq!(
            adapter.endpoint(false),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent"
        );
        assert_eq!(
            adapter.endpoint(true),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:streamGenerateContent?alt=sse"
        );

        let built = adapter
            .build_request(&GenerationRequest::from_prompt("hi"), false)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(built.headers()["x-goog-api-key"], "g-key");
    }
}
