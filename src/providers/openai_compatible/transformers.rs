//! Request/response transformation for Chat Completions

use super::types::*;
use crate::defaults;
use crate::error::ProviderError;
use crate::types::{FinishReason, GenerationRequest, GenerationResponse, Usage};

impl From<WireUsage> for Usage {
    fn from(usage: WireUsage) -> Self {
        Usage::from_parts(
            usage.prompt_tokens,
            usage.completion_tokens,
            usage.total_tokens,
        )
    }
}

/// Build the vendor body from the neutral request.
pub fn transform_request<'a>(
    provider: &str,
    model: &'a str,
    request: &'a GenerationRequest,
    stream: bool,
    stream_usage: bool,
) -> Result<ChatCompletionRequest<'a>, ProviderError> {
    if request.temperature > defaults::temperature::OPENAI_MAX {
        return Err(ProviderError::unsupported(
            provider,
            format!(
                "temperature {} is outside the supported range 0.0..={}",
                request.temperature,
                defaults::temperature::OPENAI_MAX
            ),
        ));
    }

    Ok(ChatCompletionRequest {
        model,
        messages: request
            .messages
            .iter()
            .map(|m| WireMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .collect(),
        temperature: request.temperature,
        max_tokens: request.max_tokens,
        stop: (!request.stop.is_empty()).then_some(request.stop.as_slice()),
        stream,
        stream_options: (stream && stream_usage).then_some(StreamOptions {
            include_usage: true,
        }),
    })
}

/// Convert a completed vendor response.
pub fn transform_response(
    provider: &str,
    model: &str,
    response: ChatCompletionResponse,
) -> Result<GenerationResponse, ProviderError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::malformed(provider, "response contained no choices"))?;

    let usage = response.usage.map(Usage::from).unwrap_or_default();
    let finish_reason = choice
        .finish_reason
        .as_deref()
        .map(FinishReason::from_openai)
        .unwrap_or(FinishReason::Unknown);

    Ok(GenerationResponse::new(
        choice.message.content.unwrap_or_default(),
        provider,
        response.model.unwrap_or_else(|| model.to_string()),
        usage,
        finish_reason,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorKind;

    #[test]
    fn request_body_carries_parameters() {
        let request = GenerationRequest::builder()
            .system("be terse")
            .user("Say hi")
            .temperature(0.3)
            .max_tokens(64)
            .stop_sequence("\n\n")
            .build()
            .unwrap();
        let body = transform_request("groq", "llama", &request, true, true).unwrap();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "llama");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "Say hi");
        assert_eq!(json["max_tokens"], 64);
        assert_eq!(json["stop"][0], "\n\n");
        assert_eq!(json["stream"], true);
        assert_eq!(json["stream_options"]["include_usage"], true);
    }

    #[test]
    fn optional_fields_are_omitted() {
        let request = GenerationRequest::from_prompt("hi");
        let json =
            serde_json::to_value(transform_request("lmstudio", "m", &request, true, false).unwrap())
                .unwrap();
        assert!(json.get("max_tokens").is_none());
        assert!(json.get("stop").is_none());
        assert!(json.get("stream_options").is_none());
    }

    #[test]
    fn temperature_above_two_is_unsupported() {
        let request = GenerationRequest::builder()
            .user("hi")
            .temperature(2.5)
            .build()
            .unwrap();
        let err = transform_request("openai", "gpt", &request, false, false).unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::UnsupportedParameter);
    }

    #[test]
    fn empty_choices_is_malformed() {
        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[],"usage":null}"#).unwrap();
        let err = transform_response("openai", "gpt", response).unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::MalformedResponse);
    }

    #[test]
    fn missing_usage_is_unknown_not_zero() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"hey"},"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        let out = transform_response("lmstudio", "local-model", response).unwrap();
        assert!(out.usage.is_unknown());
        assert_eq!(out.model, "local-model");
        assert_eq!(out.finish_reason, FinishReason::Stop);
    }
}
