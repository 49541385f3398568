//! Default Configuration Values
//!
//! Centralizes the defaults used by the adapters, the configuration loader and
//! the front ends.

use std::time::Duration;

/// Default sampling temperature for requests that do not set one.
pub const TEMPERATURE: f32 = 0.7;

/// `max_tokens` sent to vendors that require it on the wire (Anthropic).
pub const MAX_TOKENS: u32 = 4096;

/// HTTP client default configurations
pub mod http {
    use super::*;

    /// Default request timeout for HTTP requests
    ///
    /// Applied to the whole exchange, including reading a streamed body.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Default connection timeout for establishing HTTP connections
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Default User-Agent string for HTTP requests
    pub const USER_AGENT: &str = concat!("unillm/", env!("CARGO_PKG_VERSION"));

    /// Default maximum number of idle connections per host
    pub const MAX_IDLE_PER_HOST: usize = 10;

    /// Default keep-alive timeout for pooled connections
    pub const KEEP_ALIVE_TIMEOUT: Duration = Duration::from_secs(90);
}

/// Per-vendor endpoints and models
pub mod providers {
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
    pub const OPENAI_MODEL: &str = "gpt-4-turbo";

    pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
    pub const GROQ_MODEL: &str = "llama-3.1-8b-instant";

    pub const LMSTUDIO_BASE_URL: &str = "http://localhost:1234/v1";
    pub const LMSTUDIO_MODEL: &str = "local-model";

    pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
    pub const ANTHROPIC_MODEL: &str = "claude-sonnet-4-5";
    pub const ANTHROPIC_VERSION: &str = "2023-06-01";

    pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
    pub const GEMINI_MODEL: &str = "gemini-2.0-flash";
}

/// Accepted temperature ranges per vendor family (inclusive).
pub mod temperature {
    pub const OPENAI_MAX: f32 = 2.0;
    pub const ANTHROPIC_MAX: f32 = 1.0;
    pub const GEMINI_MAX: f32 = 2.0;
}
