//! Usage accounting and finish reasons

use serde::{Deserialize, Serialize};

/// Token usage reported by a provider.
///
/// `None` means the vendor did not report the count, which is different
/// from a reported zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

impl Usage {
    /// Usage with granular counts; the total is their sum, or `None` if it
    /// does not fit in a `u32`.
    pub const fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens: Some(input_tokens),
            output_tokens: Some(output_tokens),
            total_tokens: input_tokens.checked_add(output_tokens),
        }
    }

    /// Nothing was reported.
    pub const fn unknown() -> Self {
        Self {
            input_tokens: None,
            output_tokens: None,
            total_tokens: None,
        }
    }

    /// Combine whatever a vendor reported. When both granular counts are
    /// known the total is derived from them, otherwise (or on overflow) the
    /// vendor total is kept.
    pub fn from_parts(input: Option<u32>, output: Option<u32>, total: Option<u32>) -> Self {
        let total_tokens = match (input, output) {
            (Some(i), Some(o)) => i.checked_add(o).or(total),
            _ => total,
        };
        Self {
            input_tokens: input,
            output_tokens: output,
            total_tokens,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.input_tokens.is_none() && self.output_tokens.is_none() && self.total_tokens.is_none()
    }

    /// Fill in counts missing from `self` with those in `other`.
    pub fn merge(&mut self, other: &Usage) {
        let input = self.input_tokens.or(other.input_tokens);
        let output = self.output_tokens.or(other.output_tokens);
        let total = self.total_tokens.or(other.total_tokens);
        *self = Self::from_parts(input, output, total);
    }
}

/// Reason why the model stopped generating tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Completed naturally (OpenAI `stop`, Anthropic `end_turn`, Gemini `STOP`).
    Stop,
    /// Hit `max_tokens` (OpenAI `length`, Anthropic `max_tokens`, Gemini `MAX_TOKENS`).
    Length,
    /// Hit a caller-supplied stop sequence (Anthropic `stop_sequence`).
    StopSequence,
    /// Output blocked by the vendor's safety filters.
    ContentFilter,
    /// The model asked to call tools.
    ToolCalls,
    /// The vendor reported an internal error as the stop reason.
    Error,
    /// A vendor reason with no neutral counterpart.
    Other(String),
    /// No finish reason was transmitted, e.g. a stream that ended without a
    /// completion frame.
    Unknown,
}

impl FinishReason {
    /// Map OpenAI-compatible `finish_reason` values.
    pub fn from_openai(reason: &str) -> Self {
        match reason {
            "stop" => Self::Stop,
            "length" => Self::Length,
            "content_filter" => Self::ContentFilter,
            "tool_calls" | "function_call" => Self::ToolCalls,
            other => Self::Other(other.to_string()),
        }
    }

    /// Map Anthropic `stop_reason` values.
    pub fn from_anthropic(reason: &str) -> Self {
        match reason {
            "end_turn" | "pause_turn" => Self::Stop,
            "max_tokens" => Self::Length,
            "stop_sequence" => Self::StopSequence,
            "tool_use" => Self::ToolCalls,
            "refusal" => Self::ContentFilter,
            other => Self::Other(other.to_string()),
        }
    }

    /// Map Gemini `finishReason` values.
    pub fn from_gemini(reason: &str) -> Self {
        match reason {
            "STOP" => Self::Stop,
            "MAX_TOKENS" => Self::Length,
            "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII" => {
                Self::ContentFilter
            }
            "MALFORMED_FUNCTION_CALL" => Self::Error,
            "FINISH_REASON_UNSPECIFIED" => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }
}
