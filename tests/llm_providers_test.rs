// ABOUTME: Integration tests for the Gemini and OpenAI-compatible chat providers
// ABOUTME: Wire format, JSON mode, usage reporting, and error classification via wiremock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use outreach_core::errors::ErrorCode;
use outreach_intel::llm::{
    ChatMessage, ChatRequest, GeminiProvider, LlmProvider, OpenAiCompatibleConfig,
    OpenAiCompatibleProvider,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn report_request() -> ChatRequest {
    ChatRequest::new(vec![
        ChatMessage::system("You write outreach reports."),
        ChatMessage::user("Website content: Acme Foundation reduces hunger."),
    ])
    .with_temperature(0.5)
    .with_max_tokens(2_048)
    .with_json_output()
}

#[tokio::test]
async fn test_gemini_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .and(header("x-goog-api-key", "gemini-key"))
        .and(body_string_contains("You write outreach reports."))
        .and(body_string_contains("\"responseMimeType\":\"application/json\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "{\"insights\":" }, { "text": "[]}" }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 40, "candidatesTokenCount": 8, "totalTokenCount": 48 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::new("gemini-key").with_base_url(server.uri());
    let response = provider.complete(&report_request()).await.unwrap();

    assert_eq!(response.content, "{\"insights\":[]}");
    assert_eq!(response.model, "gemini-2.5-flash");
    assert_eq!(response.finish_reason.as_deref(), Some("STOP"));
    assert_eq!(response.usage.map(|u| u.total_tokens), Some(48));
}

#[tokio::test]
async fn test_gemini_quota_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "code": 429, "message": "Resource has been exhausted" }
        })))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new("gemini-key").with_base_url(server.uri());
    let error = provider.complete(&report_request()).await.unwrap_err();

    assert_eq!(error.code, ErrorCode::ExternalRateLimited);
    assert!(error.message.contains("Resource has been exhausted"));
}

#[tokio::test]
async fn test_gemini_empty_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new("gemini-key").with_base_url(server.uri());
    let error = provider.complete(&report_request()).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::ExternalServiceError);
}

#[tokio::test]
async fn test_openai_completion_uses_json_mode() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer openai-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "max_tokens": 2048,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": "You write outreach reports." },
                { "role": "user", "content": "Website content: Acme Foundation reduces hunger." }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "gpt-4o-mini-2024-07-18",
            "choices": [{
                "message": { "role": "assistant", "content": "{\"insights\":[]}" },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 30, "completion_tokens": 6, "total_tokens": 36 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiCompatibleProvider::new(
        OpenAiCompatibleConfig::openai("openai-key").with_base_url(server.uri()),
    );
    let response = provider.complete(&report_request()).await.unwrap();

    assert_eq!(response.content, "{\"insights\":[]}");
    assert_eq!(response.model, "gpt-4o-mini-2024-07-18");
    assert_eq!(response.usage.map(|u| u.prompt_tokens), Some(30));
}

#[tokio::test]
async fn test_local_server_without_json_mode_or_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "plain answer" }, "finish_reason": "stop" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiCompatibleProvider::new(
        OpenAiCompatibleConfig::local()
            .with_base_url(server.uri())
            .with_default_model("tiny"),
    );
    let response = provider.complete(&report_request()).await.unwrap();
    assert_eq!(response.model, "tiny");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("response_format").is_none());
    assert_eq!(body["messages"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_openai_error_classification() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("Authorization", "Bearer limited-key"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "message": "Rate limit reached", "type": "requests" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(header("Authorization", "Bearer bad-key"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
        })))
        .mount(&server)
        .await;

    let limited = OpenAiCompatibleProvider::new(
        OpenAiCompatibleConfig::openai("limited-key").with_base_url(server.uri()),
    );
    let error = limited.complete(&report_request()).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::ExternalRateLimited);

    let unauthorized = OpenAiCompatibleProvider::new(
        OpenAiCompatibleConfig::groq("bad-key").with_base_url(server.uri()),
    );
    let error = unauthorized.complete(&report_request()).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::ExternalAuthFailed);
}

#[tokio::test]
async fn test_health_checks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let openai = OpenAiCompatibleProvider::new(
        OpenAiCompatibleConfig::openai("openai-key").with_base_url(server.uri()),
    );
    assert!(openai.health_check().await.unwrap());

    let gemini =
        GeminiProvider::new("gemini-key").with_base_url(format!("{}/missing", server.uri()));
    assert!(!gemini.health_check().await.unwrap());
}
