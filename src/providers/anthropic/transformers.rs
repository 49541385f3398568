//! Request/response transformation for the Messages API

use super::types::*;
use crate::defaults;
use crate::error::{ProviderError, ProviderErrorKind};
use crate::types::{FinishReason, GenerationRequest, GenerationResponse, Role, Usage};

impl From<AnthropicUsage> for Usage {
    fn from(usage: AnthropicUsage) -> Self {
        Usage::from_parts(usage.input_tokens, usage.output_tokens, None)
    }
}

pub fn transform_request<'a>(
    provider: &str,
    model: &'a str,
    request: &'a GenerationRequest,
    stream: bool,
) -> Result<MessagesRequest<'a>, ProviderError> {
    if request.temperature > defaults::temperature::ANTHROPIC_MAX {
        return Err(ProviderError::unsupported(
            provider,
            format!(
                "temperature {} is outside the supported range 0.0..={}",
                request.temperature,
                defaults::temperature::ANTHROPIC_MAX
            ),
        ));
    }

    let messages: Vec<AnthropicMessage<'a>> = request
        .messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| AnthropicMessage {
            role: m.role.as_str(),
            content: &m.content,
        })
        .collect();
    if messages.is_empty() {
        return Err(ProviderError::new(
            provider,
            ProviderErrorKind::InvalidRequest,
            "at least one user or assistant message is required",
        ));
    }

    Ok(MessagesRequest {
        model,
        messages,
        system: request.system_prompt(),
        max_tokens: request.max_tokens.unwrap_or(defaults::MAX_TOKENS),
        temperature: request.temperature,
        stop_sequences: (!request.stop.is_empty()).then_some(request.stop.as_slice()),
        stream,
    })
}

pub fn transform_response(
    provider: &str,
    model: &str,
    response: MessagesResponse,
) -> Result<GenerationResponse, ProviderError> {
    let text_blocks: Vec<String> = response
        .content
        .into_iter()
        .filter(|b| b.block_type == "text")
        .filter_map(|b| b.text)
        .collect();
    if text_blocks.is_empty() && response.stop_reason.is_none() {
        return Err(ProviderError::malformed(
            provider,
            "response contained no text content",
        ));
    }

    let finish_reason = response
        .stop_reason
        .as_deref()
        .map(FinishReason::from_anthropic)
        .unwrap_or(FinishReason::Unknown);

    Ok(GenerationResponse::new(
        text_blocks.concat(),
        provider,
        response.model.unwrap_or_else(|| model.to_string()),
        response.usage.map(Usage::from).unwrap_or_default(),
        finish_reason,
    ))
}
