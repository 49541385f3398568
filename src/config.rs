//! Provider configuration
//!
//! Configuration is read once at startup, from the environment (after loading
//! a `.env` file when present) or from a TOML file, and never reloaded.
//!
//! ```toml
//! [[providers]]
//! kind = "groq"
//! model = "llama-3.3-70b-versatile"
//!
//! [[providers]]
//! kind = "lmstudio"
//! base_url = "http://172.31.64.1:1234/v1"
//! timeout_secs = 120
//! ```
//!
//! A provider listed without a usable credential is dropped from the
//! resulting registry, not treated as a fatal error.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

use crate::defaults;
use crate::error::LlmError;

/// Environment variable holding the explicit provider order.
pub const PROVIDER_ORDER_ENV: &str = "UNILLM_PROVIDERS";
/// Environment variable overriding the request timeout (seconds).
pub const TIMEOUT_ENV: &str = "UNILLM_TIMEOUT_SECS";
/// Environment variable overriding the connect timeout (seconds).
pub const CONNECT_TIMEOUT_ENV: &str = "UNILLM_CONNECT_TIMEOUT_SECS";

/// Supported vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum ProviderKind {
    OpenAi,
    Groq,
    LmStudio,
    Anthropic,
    Gemini,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 5] = [
        Self::Groq,
        Self::OpenAi,
        Self::Anthropic,
        Self::Gemini,
        Self::LmStudio,
    ];

    /// Default order when none is configured. LM Studio is appended only
    /// when a local base URL was configured.
    pub const DEFAULT_ORDER: [ProviderKind; 4] =
        [Self::Groq, Self::OpenAi, Self::Anthropic, Self::Gemini];

    /// Provider id used in responses, errors and `preferred_provider`.
    pub const fn id(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Groq => "groq",
            Self::LmStudio => "lmstudio",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
        }
    }

    const fn env_prefix(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI",
            Self::Groq => "GROQ",
            Self::LmStudio => "LMSTUDIO",
            Self::Anthropic => "ANTHROPIC",
            Self::Gemini => "GEMINI",
        }
    }

    pub const fn default_base_url(&self) -> &'static str {
        use defaults::providers::*;
        match self {
            Self::OpenAi => OPENAI_BASE_URL,
            Self::Groq => GROQ_BASE_URL,
            Self::LmStudio => LMSTUDIO_BASE_URL,
            Self::Anthropic => ANTHROPIC_BASE_URL,
            Self::Gemini => GEMINI_BASE_URL,
        }
    }

    pub const fn default_model(&self) -> &'static str {
        use defaults::providers::*;
        match self {
            Self::OpenAi => OPENAI_MODEL,
            Self::Groq => GROQ_MODEL,
            Self::LmStudio => LMSTUDIO_MODEL,
            Self::Anthropic => ANTHROPIC_MODEL,
            Self::Gemini => GEMINI_MODEL,
        }
    }

    /// Locally hosted servers take no credential.
    pub const fn requires_api_key(&self) -> bool {
        !matches!(self, Self::LmStudio)
    }

    /// Whether streamed requests ask for the trailing usage frame by default.
    pub const fn default_stream_usage(&self) -> bool {
        matches!(self, Self::OpenAi | Self::Groq)
    }

    pub fn api_key_env(&self) -> String {
        format!("{}_API_KEY", self.env_prefix())
    }

    pub fn model_env(&self) -> String {
        format!("{}_MODEL", self.env_prefix())
    }

    pub fn base_url_env(&self) -> String {
        format!("{}_BASE_URL", self.env_prefix())
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "groq" => Ok(Self::Groq),
            "lmstudio" | "lm-studio" | "lm_studio" => Ok(Self::LmStudio),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(LlmError::Configuration(format!(
                "unknown provider '{other}'. Supported: openai, groq, lmstudio, anthropic, gemini"
            ))),
        }
    }
}

impl TryFrom<String> for ProviderKind {
    type Error = LlmError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Everything needed to construct one adapter. Immutable after startup.
#[derive(Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Ask OpenAI-compatible servers for the trailing usage frame
    pub stream_usage: bool,
}

impl ProviderConfig {
    /// Defaults for `kind` with the given key.
    pub fn new(kind: ProviderKind, api_key: Option<String>) -> Self {
        Self {
            kind,
            api_key: api_key.map(SecretString::from),
            base_url: kind.default_base_url().to_string(),
            model: kind.default_model().to_string(),
            timeout: defaults::http::REQUEST_TIMEOUT,
            connect_timeout: defaults::http::CONNECT_TIMEOUT,
            stream_usage: kind.default_stream_usage(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_stream_usage(mut self, enabled: bool) -> Self {
        self.stream_usage = enabled;
        self
    }

    /// The API key, or an empty string for keyless providers.
    pub fn api_key(&self) -> &str {
        self.api_key
            .as_ref()
            .map(|k| k.expose_secret())
            .unwrap_or_default()
    }

    pub fn has_credentials(&self) -> bool {
        !self.kind.requires_api_key() || !self.api_key().trim().is_empty()
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("stream_usage", &self.stream_usage)
            .finish()
    }
}

/// Ordered provider configurations.
///
/// Providers without credentials are already filtered out; the order is the
/// fallback priority.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub providers: Vec<ProviderConfig>,
}

/// Source of variable lookups, so tests need not touch the process env.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Process environment.
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

impl<F> EnvSource for F
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        self(key)
    }
}

#[derive(Debug, Deserialize)]
struct FileSettings {
    #[serde(default)]
    providers: Vec<FileProvider>,
}

#[derive(Debug, Deserialize)]
struct FileProvider {
    kind: ProviderKind,
    model: Option<String>,
    base_url: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
    connect_timeout_secs: Option<u64>,
    stream_usage: Option<bool>,
}

impl Settings {
    pub fn new(providers: Vec<ProviderConfig>) -> Self {
        Self { providers }
    }

    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Result<Self, LlmError> {
        check_dotenv(dotenvy::dotenv())?;
        Self::from_env_source(&ProcessEnv)
    }

    /// Read configuration from an arbitrary variable source.
    pub fn from_env_source(env: &impl EnvSource) -> Result<Self, LlmError> {
        let (timeout, connect_timeout) = transport_defaults(env)?;
        let lmstudio_url = env
            .get(&ProviderKind::LmStudio.base_url_env())
            .or_else(|| env.get("lmstudio_base_url"));

        let order = match env.get(PROVIDER_ORDER_ENV) {
            Some(list) => parse_order(&list),
            None => {
                let mut order = ProviderKind::DEFAULT_ORDER.to_vec();
                if lmstudio_url.is_some() {
                    order.push(ProviderKind::LmStudio);
                }
                order
            }
        };

        let configs = order.into_iter().map(|kind| {
            let mut config = ProviderConfig::new(kind, env.get(&kind.api_key_env()))
                .with_timeout(timeout)
                .with_connect_timeout(connect_timeout);
            let base_url = match kind {
                ProviderKind::LmStudio => lmstudio_url.clone(),
                _ => env.get(&kind.base_url_env()),
            };
            if let Some(base_url) = base_url {
                config = config.with_base_url(base_url);
            }
            if let Some(model) = env.get(&kind.model_env()) {
                config = config.with_model(model);
            }
            config
        });

        Ok(Self::new(retain_usable(configs)))
    }

    /// Parse a TOML configuration file. Missing keys fall back to the
    /// process environment.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LlmError> {
        check_dotenv(dotenvy::dotenv())?;
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text, &ProcessEnv)
    }

    pub fn from_toml_str(text: &str, env: &impl EnvSource) -> Result<Self, LlmError> {
        let file: FileSettings = toml::from_str(text)?;
        let (timeout, connect_timeout) = transport_defaults(env)?;

        let configs = file.providers.into_iter().map(|entry| {
            let kind = entry.kind;
            let api_key = entry.api_key.or_else(|| env.get(&kind.api_key_env()));
            let mut config = ProviderConfig::new(kind, api_key)
                .with_timeout(entry.timeout_secs.map_or(timeout, Duration::from_secs))
                .with_connect_timeout(
                    entry
                        .connect_timeout_secs
                        .map_or(connect_timeout, Duration::from_secs),
                );
            if let Some(base_url) = entry.base_url.or_else(|| env.get(&kind.base_url_env())) {
                config = config.with_base_url(base_url);
            }
            if let Some(model) = entry.model.or_else(|| env.get(&kind.model_env())) {
                config = config.with_model(model);
            }
            if let Some(stream_usage) = entry.stream_usage {
                config = config.with_stream_usage(stream_usage);
            }
            config
        });

        Ok(Self::new(retain_usable(configs)))
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// A missing `.env` is fine; one that fails to load is a configuration error.
fn check_dotenv(result: Result<PathBuf, dotenvy::Error>) -> Result<(), LlmError> {
    match result {
        Ok(path) => {
            debug!("loaded environment from {}", path.display());
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(LlmError::Configuration(format!("failed to load .env: {e}"))),
    }
}

fn transport_defaults(env: &impl EnvSource) -> Result<(Duration, Duration), LlmError> {
    let secs = |key: &str, default: Duration| -> Result<Duration, LlmError> {
        match env.get(key) {
            Some(raw) => raw.trim().parse::<u64>().map(Duration::from_secs).map_err(|_| {
                LlmError::Configuration(format!("{key} must be a whole number of seconds, got '{raw}'"))
            }),
            None => Ok(default),
        }
    };
    Ok((
        secs(TIMEOUT_ENV, defaults::http::REQUEST_TIMEOUT)?,
        secs(CONNECT_TIMEOUT_ENV, defaults::http::CONNECT_TIMEOUT)?,
    ))
}

fn parse_order(list: &str) -> Vec<ProviderKind> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| match name.parse::<ProviderKind>() {
            Ok(kind) => Some(kind),
            Err(e) => {
                warn!("ignoring provider in {PROVIDER_ORDER_ENV}: {e}");
                None
            }
        })
        .collect()
}

/// Drop providers without credentials and repeated kinds, keeping order.
fn retain_usable(configs: impl Iterator<Item = ProviderConfig>) -> Vec<ProviderConfig> {
    let mut kept: Vec<ProviderConfig> = Vec::new();
    for config in configs {
        if kept.iter().any(|c| c.kind == config.kind) {
            warn!(provider = %config.kind, "provider configured twice, keeping the first entry");
            continue;
        }
        if !config.has_credentials() {
            warn!(
                provider = %config.kind,
                "{} is not set, provider excluded",
                config.kind.api_key_env()
            );
            continue;
        }
        kept.push(config);
    }
    kept
}
