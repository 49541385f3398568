//! Provider Registry
//!
//! Ordered adapters built once at startup. The order is the fallback
//! priority; nothing here is mutated after construction.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{ProviderKind, Settings};
use crate::error::LlmError;
use crate::providers::create_adapter;
use crate::traits::ProviderAdapter;

/// Ordered set of constructed adapters.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    adapters: Vec<Arc<dyn ProviderAdapter>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.provider_ids())
            .finish()
    }
}

impl ProviderRegistry {
    /// Build one adapter per configured provider.
    ///
    /// A provider whose adapter cannot be constructed is excluded with a
    /// warning. Fails only when nothing remains.
    pub fn from_settings(settings: &Settings) -> Result<Self, LlmError> {
        let mut adapters = Vec::with_capacity(settings.providers.len());
        for config in &settings.providers {
            match create_adapter(config) {
                Ok(adapter) => adapters.push(adapter),
                Err(e) => warn!(provider = %config.kind, error = %e, "excluding provider"),
            }
        }

        let registry = Self::from_adapters(adapters);
        if registry.is_empty() {
            return Err(LlmError::Configuration(
                "no LLM provider is configured; set at least one of OPENAI_API_KEY, \
                 GROQ_API_KEY, ANTHROPIC_API_KEY, GEMINI_API_KEY or LMSTUDIO_BASE_URL"
                    .to_string(),
            ));
        }
        info!(providers = ?registry.provider_ids(), "provider registry ready");
        Ok(registry)
    }

    /// Use already constructed adapters in the given order. Later adapters
    /// whose id repeats an earlier one are dropped.
    pub fn from_adapters(adapters: Vec<Arc<dyn ProviderAdapter>>) -> Self {
        let mut unique: Vec<Arc<dyn ProviderAdapter>> = Vec::with_capacity(adapters.len());
        for adapter in adapters {
            if unique
                .iter()
                .any(|a| a.provider_id() == adapter.provider_id())
            {
                warn!(provider = %adapter.provider_id(), "duplicate provider ignored");
                continue;
            }
            unique.push(adapter);
        }
        Self { adapters: unique }
    }

    pub fn get(&self, provider_id: &str) -> Option<&Arc<dyn ProviderAdapter>> {
        self.adapters.iter().find(|a| a.provider_id() == provider_id)
    }

    pub fn provider_ids(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.provider_id()).collect()
    }

    pub fn adapters(&self) -> &[Arc<dyn ProviderAdapter>] {
        &self.adapters
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Candidate order for one call.
    ///
    /// A configured `preferred` provider goes first and the rest follow in
    /// registry order. `preferred` matches an adapter id exactly, or any
    /// spelling [`ProviderKind`] accepts (`Claude`, `lm-studio`). An unknown
    /// `preferred` is logged and ignored.
    pub fn candidates(&self, preferred: Option<&str>) -> Vec<Arc<dyn ProviderAdapter>> {
        let Some(preferred) = preferred.map(str::trim).filter(|p| !p.is_empty()) else {
            return self.adapters.clone();
        };

        let position = |id: &str| self.adapters.iter().position(|a| a.provider_id() == id);
        let found = position(preferred).or_else(|| {
            preferred
                .parse::<ProviderKind>()
                .ok()
                .and_then(|kind| position(kind.id()))
        });

        match found {
            Some(index) => {
                let mut order = Vec::with_capacity(self.adapters.len());
                order.push(self.adapters[index].clone());
                order.extend(
                    self.adapters
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| *i != index)
                        .map(|(_, a)| a.clone()),
                );
                order
            }
            None => {
                warn!(
                    preferred = %preferred,
                    available = ?self.provider_ids(),
                    "preferred provider is not configured, using default order"
                );
                self.adapters.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;

    fn settings(kinds: &[ProviderKind]) -> Settings {
        Settings::new(
            kinds
                .iter()
                .map(|k| ProviderConfig::new(*k, Some("key".into())))
                .collect(),
        )
    }

    fn ids(candidates: &[Arc<dyn ProviderAdapter>]) -> Vec<String> {
        candidates.iter().map(|a| a.provider_id().to_string()).collect()
    }

    #[test]
    fn registry_keeps_configured_order() {
        let registry = ProviderRegistry::from_settings(&settings(&[
            ProviderKind::Gemini,
            ProviderKind::Groq,
            ProviderKind::Anthropic,
        ]))
        .unwrap();
        assert_eq!(registry.provider_ids(), vec!["gemini", "groq", "anthropic"]);
        assert_eq!(ids(&registry.candidates(None)), vec!["gemini", "groq", "anthropic"]);
    }

    #[test]
    fn preferred_provider_moves_to_front() {
        let registry = ProviderRegistry::from_settings(&settings(&[
            ProviderKind::Groq,
            ProviderKind::OpenAi,
            ProviderKind::Anthropic,
        ]))
        .unwrap();
        assert_eq!(
            ids(&registry.candidates(Some("anthropic"))),
            vec!["anthropic", "groq", "openai"]
        );
    }

    #[test]
    fn preferred_accepts_kind_aliases_and_case() {
        let registry = ProviderRegistry::from_settings(&settings(&[
            ProviderKind::Groq,
            ProviderKind::Anthropic,
            ProviderKind::Gemini,
        ]))
        .unwrap();
        assert_eq!(
            ids(&registry.candidates(Some("Claude"))),
            vec!["anthropic", "groq", "gemini"]
        );
        assert_eq!(
            ids(&registry.candidates(Some("GOOGLE"))),
            vec!["gemini", "groq", "anthropic"]
        );
    }

    #[test]
    fn unknown_preferred_uses_registry_order() {
        let registry =
            ProviderRegistry::from_settings(&settings(&[ProviderKind::Groq, ProviderKind::OpenAi]))
                .unwrap();
        assert_eq!(ids(&registry.candidates(Some("mistral"))), vec!["groq", "openai"]);
    }

    #[test]
    fn duplicates_keep_first() {
        let registry =
            ProviderRegistry::from_settings(&settings(&[ProviderKind::Groq, ProviderKind::Groq]))
                .unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn empty_settings_is_a_configuration_error() {
        let err = ProviderRegistry::from_settings(&Settings::default()).unwrap_err();
        assert!(matches!(err, LlmError::Configuration(_)));
    }
}
