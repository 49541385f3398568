//! Facade over real adapters talking to mock vendors

use futures::StreamExt;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unillm::{
    GenerationRequest, LlmError, ProviderErrorKind, ProviderKind, ProviderRegistry, Settings,
    UnifiedLlm, collect_stream,
};

#[path = "support/sse.rs"]
mod support;

use support::{fixture, mock_config, sse_body, sse_response};

fn request() -> GenerationRequest {
    GenerationRequest::builder()
        .user("Say hi")
        .temperature(0.7)
        .build()
        .unwrap()
}

async fn llm(configs: Vec<unillm::ProviderConfig>) -> UnifiedLlm {
    UnifiedLlm::new(ProviderRegistry::from_settings(&Settings::new(configs)).unwrap())
}

#[tokio::test]
async fn rate_limited_groq_falls_back_to_anthropic() {
    let groq = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"message": "Rate limit reached", "type": "tokens"}
        })))
        .expect(1)
        .mount(&groq)
        .await;

    let anthropic = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "test-model",
            "content": [{"type": "text", "text": "Hi from Claude"}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 5, "output_tokens": 4}
        })))
        .expect(1)
        .mount(&anthropic)
        .await;

    let llm = llm(vec![
        mock_config(ProviderKind::Groq, &groq.uri(), Some("gsk")),
        mock_config(ProviderKind::Anthropic, &anthropic.uri(), Some("sk-ant")),
    ])
    .await;

    let response = llm.generate(&request(), None).await.unwrap();
    assert_eq!(response.provider, "anthropic");
    assert_eq!(response.content, "Hi from Claude");
    assert_eq!(response.fallback_attempts.len(), 1);
    assert!(response.fallback_attempts[0].error.is_rate_limit());
}

#[tokio::test]
async fn unreachable_and_unauthorized_providers_exhaust() {
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"code": 401, "message": "API key not valid", "status": "UNAUTHENTICATED"}
        })))
        .mount(&gemini)
        .await;

    let llm = llm(vec![
        mock_config(ProviderKind::LmStudio, "http://127.0.0.1:9/v1", None)
            .with_connect_timeout(std::time::Duration::from_secs(1)),
        mock_config(ProviderKind::Gemini, &gemini.uri(), Some("bad")),
    ])
    .await;

    let err = llm.generate(&request(), None).await.unwrap_err();
    let attempts = err.attempts();
    assert!(matches!(err, LlmError::AllProvidersExhausted { .. }));
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0].provider, "lmstudio");
    assert!(matches!(
        attempts[0].error.kind,
        ProviderErrorKind::Network | ProviderErrorKind::Timeout
    ));
    assert_eq!(attempts[1].error.kind, ProviderErrorKind::Authentication);
}

#[tokio::test]
async fn stream_falls_back_when_first_vendor_refuses() {
    let openai = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&openai)
        .await;

    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/test-model:streamGenerateContent"))
        .respond_with(sse_response(fixture("gemini/stream.sse")))
        .expect(1)
        .mount(&gemini)
        .await;

    let llm = llm(vec![
        mock_config(ProviderKind::OpenAi, &openai.uri(), Some("k")),
        mock_config(ProviderKind::Gemini, &gemini.uri(), Some("g")),
    ])
    .await;

    let stream = llm.generate_streaming(&request(), None).await.unwrap();
    let response = collect_stream(stream).await.unwrap();
    assert_eq!(response.provider, "gemini");
    assert_eq!(response.content, "Hello world");
    assert_eq!(response.usage.total_tokens, Some(7));
}

#[tokio::test]
async fn broken_stream_after_output_does_not_contact_next_vendor() {
    let groq = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(sse_response(sse_body(&[
            r#"{"choices":[{"delta":{"content":"Hel"}}]}"#,
            "{truncated",
        ])))
        .expect(1)
        .mount(&groq)
        .await;

    let openai = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&openai)
        .await;

    let llm = llm(vec![
        mock_config(ProviderKind::Groq, &groq.uri(), Some("gsk")),
        mock_config(ProviderKind::OpenAi, &openai.uri(), Some("k")),
    ])
    .await;

    let mut stream = llm.generate_streaming(&request(), None).await.unwrap();
    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.provider, "groq");
    assert_eq!(first.item.as_text(), Some("Hel"));

    let err = stream.next().await.unwrap().unwrap_err();
    assert!(matches!(err, LlmError::StreamInterrupted { .. }));
    assert!(stream.next().await.is_none());
}
