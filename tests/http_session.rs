//! End-to-end tests of the chat example and the pipe over `HttpSession`,
//! against a mock chat-completions server.

use lorica_pipe::{run_chat, ExampleConfig, HostReply, HttpSession, Pipe, Valves};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EVENT_STREAM: &str = concat!(
    "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
    "data: {\"choices\":[{\"delta\":{\"content\":\"A\"}}]}\n\n",
    "data: not-json\n\n",
    "data: {\"choices\":[{\"delta\":{\"content\":\"B\"}}]}\n\n",
    "data: [DONE]\n\n",
);

fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1677652288,
        "model": "m",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

fn example_config(server: &MockServer, stream: bool) -> ExampleConfig {
    ExampleConfig::builder()
        .deployment_url(server.uri())
        .api_key("test-api-key")
        .stream(stream)
        .build()
        .unwrap()
}

fn body(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn test_chat_non_streaming_prints_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer test-api-key"))
        .and(body_partial_json(json!({"stream": false, "max_tokens": 1024})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("X")))
        .expect(1)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    run_chat(&HttpSession::new(), &example_config(&server, false), &mut out)
        .await
        .unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "X\n");
}

#[tokio::test]
async fn test_chat_streaming_prints_deltas() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(EVENT_STREAM, "text/event-stream"))
        .mount(&server)
        .await;

    let mut out = Vec::new();
    run_chat(&HttpSession::new(), &example_config(&server, true), &mut out)
        .await
        .unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "AB");
}

#[tokio::test]
async fn test_chat_error_status_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut out = Vec::new();
    let result = run_chat(&HttpSession::new(), &example_config(&server, true), &mut out).await;

    assert!(result.is_err());
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_pipe_overrides_model_and_forces_stream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-valve"))
        .and(header("Content-Type", "application/json"))
        .and(body_partial_json(json!({
            "model": "org/configured",
            "stream": true,
            "temperature": 0.1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("X")))
        .expect(1)
        .mount(&server)
        .await;

    let pipe = Pipe::with_valves(
        Arc::new(HttpSession::new()),
        Valves::new(server.uri(), "sk-valve", "org/configured"),
    );
    let inbound = body(json!({
        "model": "caller/model",
        "messages": [{"role": "user", "content": "hi"}],
        "temperature": 0.1,
        "stream": false
    }));

    match pipe.pipe(&inbound, &Value::Null).await {
        HostReply::Json(value) => assert_eq!(value["choices"][0]["message"]["content"], "X"),
        other => panic!("expected JSON reply, got {other:?}"),
    }
}

#[tokio::test]
async fn test_pipe_stream_returns_raw_lines() {
    use futures::StreamExt;

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(EVENT_STREAM, "text/event-stream"))
        .mount(&server)
        .await;

    let pipe = Pipe::with_valves(
        Arc::new(HttpSession::new()),
        Valves::new(server.uri(), "k", "m"),
    );
    let inbound = body(json!({"messages": [], "stream": true}));

    let HostReply::Lines(lines) = pipe.pipe(&inbound, &Value::Null).await else {
        panic!("expected a line stream");
    };
    let lines: Vec<String> = lines.map(|l| l.unwrap()).collect().await;
    let expected: Vec<&str> = EVENT_STREAM.lines().collect();
    assert_eq!(lines, expected);
}

#[tokio::test]
async fn test_pipe_error_status_returns_error_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided"}
        })))
        .mount(&server)
        .await;

    let pipe = Pipe::with_valves(
        Arc::new(HttpSession::new()),
        Valves::new(server.uri(), "bad", "m"),
    );
    let reply = pipe
        .pipe(&body(json!({"messages": [], "stream": true})), &Value::Null)
        .await;

    let text = reply.error_text().unwrap();
    assert!(text.starts_with("Error:"), "{text}");
    assert!(text.contains("401"), "{text}");
}

#[tokio::test]
async fn test_pipe_unreachable_upstream_returns_error_text() {
    let pipe = Pipe::with_valves(
        Arc::new(HttpSession::new()),
        Valves::new("http://127.0.0.1:1", "k", "m"),
    );
    let reply = pipe
        .pipe(&body(json!({"messages": []})), &Value::Null)
        .await;

    let text = reply.error_text().unwrap();
    assert!(text.starts_with("Error: request to http://127.0.0.1:1"), "{text}");
}
