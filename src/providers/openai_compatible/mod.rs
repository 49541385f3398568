//! OpenAI-Compatible Providers
//!
//! OpenAI, Groq and LM Studio all speak the Chat Completions wire format and
//! differ only in base URL, credentials and whether they honour
//! `stream_options.include_usage`. One adapter covers all three.

pub mod client;
pub mod streaming;
pub mod transformers;
pub mod types;

pub use client::OpenAiCompatibleAdapter;
pub use streaming::OpenAiCompatibleEventConverter;
