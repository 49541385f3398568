//! Google Gemini Provider
//!
//! `generateContent` adapter. The assistant role is called `model` on the wire
//! and system turns become `systemInstruction`.

pub mod client;
pub mod streaming;
pub mod transformers;
pub mod types;

pub use client::GeminiAdapter;
pub use streaming::GeminiEventConverter;
