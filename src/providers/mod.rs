//! Provider Implementations
//!
//! One adapter per wire format. [`create_adapter`] maps a
//! [`ProviderConfig`] onto the right one.

pub mod anthropic;
pub mod gemini;
pub mod openai_compatible;

use std::sync::Arc;

use crate::config::{ProviderConfig, ProviderKind};
use crate::error::ProviderError;
use crate::traits::ProviderAdapter;

pub use anthropic::AnthropicAdapter;
pub use gemini::GeminiAdapter;
pub use openai_compatible::OpenAiCompatibleAdapter;

/// Build the adapter for one configured provider.
pub fn create_adapter(config: &ProviderConfig) -> Result<Arc<dyn ProviderAdapter>, ProviderError> {
    let adapter: Arc<dyn ProviderAdapter> = match config.kind {
        ProviderKind::OpenAi | ProviderKind::Groq | ProviderKind::LmStudio => {
            Arc::new(OpenAiCompatibleAdapter::new(config)?)
        }
        ProviderKind::Anthropic => Arc::new(AnthropicAdapter::new(config)?),
        ProviderKind::Gemini => Arc::new(GeminiAdapter::new(config)?),
    };
    Ok(adapter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_adapters() {
        for kind in ProviderKind::ALL {
            let config = ProviderConfig::new(kind, Some("key".into())).with_model("m");
            let adapter = create_adapter(&config).unwrap();
            assert_eq!(adapter.provider_id(), kind.id());
            assert_eq!(adapter.model(), "m");
        }
    }
}
