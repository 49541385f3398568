//! Axum-specific server adapters
//!
//! ## Routes
//!
//! - `POST /api/chat`: JSON [`GenerationRequest`] plus optional `provider`,
//!   answered with a JSON [`GenerationResponse`](crate::types::GenerationResponse).
//! - `POST /api/chat/stream`: same body, answered with SSE events `start`,
//!   `delta`, `usage` and `error`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use unillm::{UnifiedLlm, server_adapters::axum::serve};
//!
//! let llm = UnifiedLlm::from_env()?;
//! serve(llm, "127.0.0.1:8080".parse()?).await?;
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{SseOptions, error_payload, sse_payload, start_payload};
use crate::error::LlmError;
use crate::facade::UnifiedLlm;
use crate::stream::ChatStream;
use crate::types::GenerationRequest;

/// Request body of both chat routes.
#[derive(Debug, Deserialize)]
pub struct ChatBody {
    #[serde(flatten)]
    pub request: GenerationRequest,
    /// Provider to try first
    #[serde(default)]
    pub provider: Option<String>,
}

/// Convert a facade stream into an Axum SSE response.
///
/// `start` is sent before the first item, naming the serving provider.
pub fn to_sse_response(
    stream: ChatStream,
    opts: SseOptions,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send> {
    let events = async_stream::stream! {
        let mut stream = stream;
        let mut started = false;
        while let Some(item) = stream.next().await {
            match item {
                Ok(chunk) => {
                    if !started {
                        started = true;
                        yield Ok(Event::default().event("start").data(start_payload(&chunk, &opts).to_string()));
                    }
                    if let Some((name, data)) = sse_payload(&chunk, &opts) {
                        yield Ok(Event::default().event(name).data(data.to_string()));
                    }
                }
                Err(e) => {
                    yield Ok(Event::default().event("error").data(error_payload(&e, &opts).to_string()));
                    return;
                }
            }
        }
    };

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// JSON error response for a facade failure.
pub fn error_response(error: &LlmError) -> Response {
    let status = match error {
        LlmError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        LlmError::AllProvidersExhausted { .. }
        | LlmError::Provider(_)
        | LlmError::StreamInterrupted { .. } => StatusCode::BAD_GATEWAY,
        LlmError::Configuration(_) | LlmError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = json!({
        "error": error.to_string(),
        "attempts": error.attempts(),
    });
    (status, Json(body)).into_response()
}

async fn chat(State(llm): State<UnifiedLlm>, Json(body): Json<ChatBody>) -> Response {
    match llm.generate(&body.request, body.provider.as_deref()).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn chat_stream(State(llm): State<UnifiedLlm>, Json(body): Json<ChatBody>) -> Response {
    match llm
        .generate_streaming(&body.request, body.provider.as_deref())
        .await
    {
        Ok(stream) => to_sse_response(stream, SseOptions::default()).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Router with both chat routes over `llm`.
pub fn router(llm: UnifiedLlm) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/chat/stream", post(chat_stream))
        .with_state(llm)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(llm: UnifiedLlm, addr: SocketAddr) -> Result<(), LlmError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, providers = ?llm.registry().provider_ids(), "chat server listening");
    axum::serve(listener, router(llm))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
