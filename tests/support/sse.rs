//! Helpers for serving SSE bodies and vendor configs from wiremock

#![allow(dead_code)]

use wiremock::ResponseTemplate;

use unillm::{ProviderConfig, ProviderKind};

/// Join `data:` payloads into one SSE body.
pub fn sse_body(frames: &[&str]) -> String {
    frames
        .iter()
        .map(|f| format!("data: {f}\n\n"))
        .collect()
}

/// Join `(event, data)` pairs into one SSE body.
pub fn named_sse_body(frames: &[(&str, &str)]) -> String {
    frames
        .iter()
        .map(|(event, data)| format!("event: {event}\ndata: {data}\n\n"))
        .collect()
}

pub fn sse_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/event-stream")
}

/// Load a fixture under `tests/fixtures`.
pub fn fixture(path: &str) -> String {
    std::fs::read_to_string(format!("{}/tests/fixtures/{path}", env!("CARGO_MANIFEST_DIR")))
        .expect("fixture exists")
        .replace("\r\n", "\n")
}

/// Config for `kind` pointed at a mock server.
pub fn mock_config(kind: ProviderKind, base_url: &str, api_key: Option<&str>) -> ProviderConfig {
    ProviderConfig::new(kind, api_key.map(str::to_string))
        .with_base_url(base_url)
        .with_model("test-model")
}
