use futures::StreamExt;
use quill_llm::{
    ChatClient, ChatOptions, ChatRequest, LlmError, Message, OpenAIClient, ResponseFormat,
    StreamEvent,
};

fn request() -> ChatRequest {
    ChatRequest::new("gpt-4o-mini", vec![Message::human("Write a post")])
}

#[tokio::test]
async fn test_chat_returns_structured_content() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"id":"c1","model":"gpt-4o-mini","choices":[{"index":0,"message":{"role":"assistant","content":"{\"intent\":\"edit\"}"},"finish_reason":"stop"}],"usage":{"prompt_tokens":5,"completion_tokens":3,"total_tokens":8}}"#,
        )
        .create_async()
        .await;

    let client = OpenAIClient::new("test-key").unwrap().with_base_url(server.url());
    let options = ChatOptions::new()
        .temperature(0.0)
        .response_format(ResponseFormat::json_schema("intent", serde_json::json!({"type": "object"})));
    let response = client.chat(request().with_options(options)).await.unwrap();

    assert_eq!(response.content.as_deref(), Some(r#"{"intent":"edit"}"#));
    assert_eq!(response.usage.unwrap().total_tokens, 8);
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unauthorized_maps_to_auth_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(r#"{"error":{"message":"Incorrect API key"}}"#)
        .create_async()
        .await;

    let client = OpenAIClient::new("bad-key").unwrap().with_base_url(server.url());
    let err = client.chat_stream(request()).await.err().unwrap();
    assert!(err.is_auth());
}

#[tokio::test]
async fn test_rate_limit_carries_retry_after() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_header("retry-after", "7")
        .with_body("slow down")
        .create_async()
        .await;

    let client = OpenAIClient::new("k").unwrap().with_base_url(server.url());
    match client.chat(request()).await {
        Err(LlmError::RateLimited { retry_after_secs, message }) => {
            assert_eq!(retry_after_secs, Some(7));
            assert_eq!(message, "slow down");
        }
        other => panic!("Expected RateLimited, got {:?}", other.map(|r| r.content)),
    }
}

#[tokio::test]
async fn test_server_error_maps_to_provider_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let client = OpenAIClient::new("k").unwrap().with_base_url(server.url());
    let err = client.chat(request()).await.err().unwrap();
    assert!(matches!(err, LlmError::Provider { status: 500, .. }));
}

#[tokio::test]
async fn test_stream_yields_fragments_in_order() {
    let body = concat!(
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Excited \"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"to share\"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
        "data: [DONE]\n\n",
    );

    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(body)
        .create_async()
        .await;

    let client = OpenAIClient::new("k").unwrap().with_base_url(server.url());
    let stream = client.chat_stream(request()).await.unwrap();
    let events: Vec<StreamEvent> = stream.map(|e| e.unwrap()).collect().await;

    assert_eq!(
        events,
        vec![
            StreamEvent::Message { content: "Excited ".to_string() },
            StreamEvent::Message { content: "to share".to_string() },
            StreamEvent::Done { finish_reason: Some("stop".to_string()) },
            StreamEvent::Done { finish_reason: None },
        ]
    );
}
