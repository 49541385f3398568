//! Error Handling Module
//!
//! Two layers of errors flow through the crate:
//! - [`ProviderError`]: a single vendor call failed. Adapters never let vendor
//!   or transport error types escape; everything is normalized here.
//! - [`LlmError`]: what the facade and the rest of the crate report, including
//!   the aggregate [`LlmError::AllProvidersExhausted`].
//!
//! # Example
//!
//! ```rust,ignore
//! use unillm::error::{ProviderError, ProviderErrorKind};
//!
//! let error = ProviderError::new("groq", ProviderErrorKind::RateLimit, "slow down");
//! assert!(error.is_rate_limit());
//! ```

mod conversions;
pub mod helpers;
pub mod types;

pub use helpers::*;
pub use types::*;
