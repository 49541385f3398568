//! OpenAI Compatible Client Implementation

use async_trait::async_trait;
use tracing::debug;

use super::streaming::OpenAiCompatibleEventConverter;
use super::transformers::{transform_request, transform_response};
use super::types::ChatCompletionResponse;
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::stream::ProviderStream;
use crate::traits::ProviderAdapter;
use crate::types::{GenerationRequest, GenerationResponse};
use crate::utils::http::{build_client, read_json, send_checked};
use crate::utils::streaming::StreamFactory;

/// Adapter for OpenAI, Groq, LM Studio and any other Chat Completions server
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleAdapter {
    provider_id: String,
    model: String,
    base_url: String,
    api_key: Option<String>,
    stream_usage: bool,
    http_client: reqwest::Client,
}

impl OpenAiCompatibleAdapter {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let provider_id = config.kind.id().to_string();
        let http_client = build_client(&provider_id, config.timeout, config.connect_timeout)?;
        let api_key = Some(config.api_key().trim())
            .filter(|k| !k.is_empty())
            .map(str::to_string);

        Ok(Self {
            provider_id,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            stream_usage: config.stream_usage,
            http_client,
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request(
        &self,
        request: &GenerationRequest,
        stream: bool,
    ) -> Result<reqwest::RequestBuilder, ProviderError> {
        let body = transform_request(
            &self.provider_id,
            &self.model,
            request,
            stream,
            self.stream_usage,
        )?;
        let url = self.chat_url();
        debug!(provider = %self.provider_id, model = %self.model, url = %url, stream, "sending chat completion");

        let mut builder = self.http_client.post(url).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        if stream {
            builder = builder.header(reqwest::header::ACCEPT, "text/event-stream");
        }
        Ok(builder)
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiCompatibleAdapter {
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
        let body: ChatCompletionResponse = read_json(&self.provider_id, response).await?;
        transform_response(&self.provider_id, &self.model, body)
    }

    async fn generate_streaming(
        &self,
        request: &GenerationRequest,
    ) -> Result<ProviderStream, ProviderError> {
        let builder = self.build_request(request, true)?;
        let converter = OpenAiCompatibleEventConverter::new(self.provider_id.clone());
        StreamFactory::create_eventsource_stream(&self.provider_id, builder, converter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;

    #[test]
    fn keyless_lmstudio_sends_no_auth() {
        let config = ProviderConfig::new(ProviderKind::LmStudio, None)
            .with_base_url("http://localhost:1234/v1/");
        let adapter = OpenAiCompatibleAdapter::new(&config).unwrap();
        assert_eq!(adapter.provider_id(), "lmstudio");
        assert_eq!(adapter.chat_url(), "http://localhost:1234/v1/chat/completions");

        let request = GenerationRequest::from_prompt("hi");
        let built = adapter.build_request(&request, false).unwrap().build().unwrap();
        assert!(built.headers().get(reqwest::header::AUTHORIZATION).is_none());
    }

    #[test]
    fn bearer_token_when_key_present() {
        let config = ProviderConfig::new(ProviderKind::Groq, Some("gsk-test".into()));
        let adapter = OpenAiCompatibleAdapter::new(&config).unwrap();
        let request = GenerationRequest::from_prompt("hi");
        let built = adapter.build_request(&request, true).unwrap().build().unwrap();
        assert_eq!(
            built.headers()[reqwest::header::AUTHORIZATION],
            "Bearer gsk-test"
        );
        assert_eq!(built.url().as_str(), "https://api.groq.com/openai/v1/chat/completions");
    }
}
