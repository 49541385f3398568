//! Vendor-neutral request and response types

pub mod chat;
pub mod common;
pub mod response;

pub use chat::{ChatMessage, GenerationRequest, GenerationRequestBuilder, Role};
pub use common::{FinishReason, Usage};
pub use response::GenerationResponse;
