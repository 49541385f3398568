//! # unillm - one request model, several LLM vendors
//!
//! A single vendor-neutral [`GenerationRequest`] is routed to an ordered list
//! of configured providers (OpenAI, Groq, LM Studio, Anthropic, Gemini). When
//! one fails, the same request goes to the next. Responses and streams come
//! back in one shape, tagged with the provider that served them.
#![deny(unsafe_code)]

//! ## Quick Start
//!
//! ```rust,no_run
//! use unillm::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), LlmError> {
//!     let llm = UnifiedLlm::from_env()?;
//!     let request = GenerationRequest::builder()
//!         .system("Answer in one sentence.")
//!         .user("What is a borrow checker?")
//!         .build()?;
//!
//!     let response = llm.generate(&request, Some("anthropic")).await?;
//!     println!("{} (via {})", response.content, response.provider);
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming
//!
//! Fallback happens only until the serving provider has produced its first
//! item. After that a failure ends the stream with
//! [`LlmError::StreamInterrupted`].
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use unillm::prelude::*;
//!
//! # async fn run(llm: UnifiedLlm, request: GenerationRequest) -> Result<(), LlmError> {
//! let mut stream = llm.generate_streaming(&request, None).await?;
//! while let Some(chunk) = stream.next().await {
//!     if let StreamItem::TextFragment { text } = chunk?.item {
//!         print!("{text}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod defaults;
pub mod error;
pub mod facade;
pub mod prompts;
pub mod providers;
pub mod registry;
pub mod server_adapters;
pub mod stream;
pub mod telemetry;
pub mod traits;
pub mod types;
pub mod utils;

pub use config::{ProviderConfig, ProviderKind, Settings};
pub use error::{FailedAttempt, LlmError, ProviderError, ProviderErrorKind};
pub use facade::UnifiedLlm;
pub use registry::ProviderRegistry;
pub use stream::{ChatStream, ProviderStream, StreamChunk, StreamItem, collect_stream};
pub use traits::ProviderAdapter;
pub use types::{
    ChatMessage, FinishReason, GenerationRequest, GenerationResponse, Role, Usage,
};

/// Commonly used types
pub mod prelude {
    pub use crate::config::{ProviderConfig, ProviderKind, Settings};
    pub use crate::error::{FailedAttempt, LlmError, ProviderError, ProviderErrorKind};
    pub use crate::facade::UnifiedLlm;
    pub use crate::stream::{ChatStream, StreamChunk, StreamItem, collect_stream};
    pub use crate::traits::ProviderAdapter;
    pub use crate::types::*;
}
