//! HTTP chat routes (requires the `server` feature)

#![cfg(feature = "server")]

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use unillm::ProviderErrorKind;
use unillm::server_adapters::axum::router;

#[path = "support/mock_adapter.rs"]
mod support;

use support::{Script, calls, facade};

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn chat_returns_serving_provider() {
    let (llm, log) = facade(vec![
        ("alpha", Script::Fail(ProviderErrorKind::RateLimit)),
        ("beta", Script::Succeed("hello there")),
    ]);

    let response = router(llm)
        .oneshot(post(
            "/api/chat",
            json!({"messages": [{"role": "user", "content": "Say hi"}], "temperature": 0.7}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["provider"], "beta");
    assert_eq!(body["content"], "hello there");
    assert_eq!(body["fallback_attempts"][0]["provider"], "alpha");
    assert_eq!(calls(&log), vec!["alpha", "beta"]);
}

#[tokio::test]
async fn preferred_provider_comes_from_body() {
    let (llm, log) = facade(vec![
        ("alpha", Script::Succeed("a")),
        ("beta", Script::Succeed("b")),
    ]);

    let response = router(llm)
        .oneshot(post(
            "/api/chat",
            json!({"messages": [{"role": "user", "content": "hi"}], "provider": "beta"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(calls(&log), vec!["beta"]);
}

#[tokio::test]
async fn exhaustion_is_bad_gateway_with_attempts() {
    let (llm, _) = facade(vec![
        ("alpha", Script::Fail(ProviderErrorKind::Authentication)),
        ("beta", Script::Fail(ProviderErrorKind::Server)),
    ]);

    let response = router(llm)
        .oneshot(post(
            "/api/chat",
            json!({"messages": [{"role": "user", "content": "hi"}]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    let attempts = body["attempts"].as_array().unwrap();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0]["error"]["kind"], "authentication");
    assert_eq!(attempts[1]["provider"], "beta");
}

#[tokio::test]
async fn empty_conversation_is_bad_request() {
    let (llm, log) = facade(vec![("alpha", Script::Succeed("a"))]);

    let response = router(llm)
        .oneshot(post("/api/chat", json!({"messages": []})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(calls(&log).is_empty());
}

#[tokio::test]
async fn stream_route_emits_start_delta_usage() {
    let (llm, _) = facade(vec![("alpha", Script::Succeed("Hello world"))]);

    let response = router(llm)
        .oneshot(post(
            "/api/chat/stream",
            json!({"messages": [{"role": "user", "content": "hi"}]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    let start = text.find("event: start").unwrap();
    let delta = text.find("event: delta").unwrap();
    let usage = text.find("event: usage").unwrap();
    assert!(start < delta && delta < usage);
    assert!(text.contains(r#""provider":"alpha""#));
    assert!(text.contains(r#""delta":"Hello ""#));
}

#[tokio::test]
async fn stream_route_reports_interruption_as_error_event() {
    let (llm, _) = facade(vec![
        ("flaky", Script::FailAfter(vec!["par"], ProviderErrorKind::Network)),
        ("backup", Script::Succeed("unused")),
    ]);

    let response = router(llm)
        .oneshot(post(
            "/api/chat/stream",
            json!({"messages": [{"role": "user", "content": "hi"}]}),
        ))
        .await
        .unwrap();

    let text = body_text(response).await;
    assert!(text.contains("event: error"));
    assert!(text.contains(r#""provider":"flaky""#));
    assert!(!text.contains("unused"));
}
