//! Shared HTTP and streaming plumbing for the adapters

pub mod http;
pub mod streaming;
