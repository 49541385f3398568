//! Request/response transformation for `generateContent`

use super::types::*;
use crate::defaults;
use crate::error::{ProviderError, ProviderErrorKind};
use crate::types::{FinishReason, GenerationRequest, GenerationResponse, Role, Usage};

impl From<UsageMetadata> for Usage {
    fn from(usage: UsageMetadata) -> Self {
        Usage::from_parts(
            usage.prompt_token_count,
            usage.candidates_token_count,
            usage.total_token_count,
        )
    }
}

const fn wire_role(role: Role) -> &'static str {
    match role {
        Role::Assistant => "model",
        _ => "user",
    }
}

pub fn transform_request<'a>(
    provider: &str,
    request: &'a GenerationRequest,
) -> Result<GenerateContentRequest<'a>, ProviderError> {
    if request.temperature > defaults::temperature::GEMINI_MAX {
        return Err(ProviderError::unsupported(
            provider,
            format!(
                "temperature {} is outside the supported range 0.0..={}",
                request.temperature,
                defaults::temperature::GEMINI_MAX
            ),
        ));
    }

    let contents: Vec<Content<'a>> = request
        .messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| Content {
            role: wire_role(m.role),
            parts: vec![Part { text: &m.content }],
        })
        .collect();
    if contents.is_empty() {
        return Err(ProviderError::new(
            provider,
            ProviderErrorKind::InvalidRequest,
            "at least one user or assistant message is required",
        ));
    }

    Ok(GenerateContentRequest {
        contents,
        system_instruction: request.system_prompt().map(|text| SystemInstruction {
            parts: vec![OwnedPart { text }],
        }),
        generation_config: GenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_tokens,
            stop_sequences: (!request.stop.is_empty()).then_some(request.stop.as_slice()),
        },
    })
}

/// Text of the first candidate, with parts concatenated.
pub fn candidate_text(response: &GenerateContentResponse) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;
    let text: String = content
        .parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect();
    Some(text)
}

/// `finishReason` of the first candidate, or `ContentFilter` for a blocked prompt.
pub fn finish_reason(response: &GenerateContentResponse) -> Option<FinishReason> {
    if let Some(reason) = response
        .candidates
        .first()
        .and_then(|c| c.finish_reason.as_deref())
    {
        return Some(FinishReason::from_gemini(reason));
    }
    response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_ref())
        .map(|_| FinishReason::ContentFilter)
}

pub fn transform_response(
    provider: &str,
    model: &str,
    response: GenerateContentResponse,
) -> Result<GenerationResponse, ProviderError> {
    let blocked = response
        .prompt_feedback
        .as_ref()
        .is_some_and(|f| f.block_reason.is_some());
    if response.candidates.is_empty() && !blocked {
        return Err(ProviderError::malformed(
            provider,
            "response contained no candidates",
        ));
    }

    let content = candidate_text(&response).unwrap_or_default();
    let finish_reason = finish_reason(&response).unwrap_or(FinishReason::Unknown);
    let usage = response.usage_metadata.map(Usage::from).unwrap_or_default();

    Ok(GenerationResponse::new(
        content,
        provider,
        response.model_version.unwrap_or_else(|| model.to_string()),
        usage,
        finish_reason,
    ))
}
