//! Tracing subscriber setup
//!
//! ## Example
//!
//! ```rust,ignore
//! use unillm::telemetry::{init_subscriber, OutputFormat, TelemetryConfig};
//!
//! let config = TelemetryConfig::builder()
//!     .log_level_str("debug")?
//!     .output_format(OutputFormat::Json)
//!     .build();
//! init_subscriber(config)?;
//! ```

use tracing_subscriber::EnvFilter;

use crate::error::LlmError;

/// Output format for tracing logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Configuration for the global subscriber
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Used when `RUST_LOG` is unset or invalid
    pub log_level: tracing::Level,
    pub output_format: OutputFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: tracing::Level::WARN,
            output_format: OutputFormat::Text,
        }
    }
}

impl TelemetryConfig {
    pub fn builder() -> TelemetryConfigBuilder {
        TelemetryConfigBuilder::default()
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.log_level.as_str().to_ascii_lowercase()))
    }
}

/// Builder for [`TelemetryConfig`]
#[derive(Debug, Default)]
pub struct TelemetryConfigBuilder {
    log_level: Option<tracing::Level>,
    output_format: Option<OutputFormat>,
}

impl TelemetryConfigBuilder {
    pub fn log_level(mut self, level: tracing::Level) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Set the log level from its name (`trace` .. `error`).
    pub fn log_level_str(mut self, level: &str) -> Result<Self, LlmError> {
        let level = level.trim().parse::<tracing::Level>().map_err(|_| {
            LlmError::Configuration(format!(
                "invalid log level: {level}. Valid options: trace, debug, info, warn, error"
            ))
        })?;
        self.log_level = Some(level);
        Ok(self)
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn build(self) -> TelemetryConfig {
        let defaults = TelemetryConfig::default();
        TelemetryConfig {
            log_level: self.log_level.unwrap_or(defaults.log_level),
            output_format: self.output_format.unwrap_or(defaults.output_format),
        }
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean
/// for generated text.
pub fn init_subscriber(config: TelemetryConfig) -> Result<(), LlmError> {
    let filter = config.filter();

    let init_result = match config.output_format {
        OutputFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .json()
            .try_init(),
        OutputFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .try_init(),
    };

    init_result
        .map_err(|e| LlmError::Configuration(format!("failed to initialize tracing: {e}")))
}
