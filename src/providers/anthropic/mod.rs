//! Anthropic Provider
//!
//! Messages API adapter. System turns travel in the top-level `system` field,
//! `max_tokens` is mandatory and temperature is limited to `0.0..=1.0`.

pub mod client;
pub mod streaming;
pub mod transformers;
pub mod types;

pub use client::AnthropicAdapter;
pub use streaming::AnthropicEventConverter;
