use futures::StreamExt;
use reqwest::Response;
use serde::{Deserialize, Serialize};

use crate::buffer_utils::{parse_sse_stream, SseLineParser};
use crate::error::LlmResult;
use crate::traits::EventStream;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Text fragment from the model
    Message {
        content: String,
    },

    /// Provider signalled end of generation
    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatStreamChunk {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub delta: Delta,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delta {
    pub role: Option<String>,
    pub content: Option<String>,
}

impl ChatStreamChunk {
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
    }

    pub fn is_done(&self) -> bool {
        self.choices
            .first()
            .and_then(|c| c.finish_reason.as_ref())
            .is_some()
    }

    fn to_stream_events(&self) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        if let Some(choice) = self.choices.first() {
            if let Some(content) = &choice.delta.content {
                if !content.is_empty() {
                    events.push(StreamEvent::Message {
                        content: content.clone(),
                    });
                }
            }

            if let Some(finish_reason) = &choice.finish_reason {
                events.push(StreamEvent::Done {
                    finish_reason: Some(finish_reason.clone()),
                });
            }
        }

        events
    }
}

/// Parses OpenAI-compatible chat completion chunks
pub struct ChatChunkParser;

impl SseLineParser for ChatChunkParser {
    fn parse_data_line(&self, data: &str) -> LlmResult<Vec<StreamEvent>> {
        let chunk: ChatStreamChunk = serde_json::from_str(data)?;
        Ok(chunk.to_stream_events())
    }
}

pub fn parse_chat_sse_stream(response: Response) -> EventStream {
    parse_sse_stream(response.bytes_stream(), ChatChunkParser)
}

/// Drain a stream into its concatenated text
pub async fn collect_text(mut stream: EventStream) -> LlmResult<String> {
    let mut text = String::new();
    while let Some(event) = stream.next().await {
        match event? {
            StreamEvent::Message { content } => text.push_str(&content),
            StreamEvent::Done { .. } => break,
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn sse_body(fragments: &[&str]) -> String {
        let mut body = String::new();
        for fragment in fragments {
            let chunk = serde_json::json!({
                "id": "chatcmpl-1",
                "model": "gpt-4o-mini",
                "choices": [{ "index": 0, "delta": { "content": fragment }, "finish_reason": null }]
            });
            body.push_str(&format!("data: {}\n\n", chunk));
        }
        body.push_str("data: [DONE]\n\n");
        body
    }

    #[tokio::test]
    async fn test_parse_split_sse_chunks() {
        let body = sse_body(&["Hello", ", ", "world"]);
        let bytes = body.into_bytes();
        let (a, b) = bytes.split_at(37);
        let chunks = vec![
            Ok::<Vec<u8>, std::io::Error>(a.to_vec()),
            Ok(b.to_vec()),
        ];

        let events = parse_sse_stream(stream::iter(chunks), ChatChunkParser);
        let text = collect_text(events).await.unwrap();
        assert_eq!(text, "Hello, world");
    }

    #[tokio::test]
    async fn test_finish_reason_emits_done() {
        let line = r#"data: {"choices":[{"index":0,"delta":{},"finish_reason":"stop"}]}"#;
        let chunks = vec![Ok::<Vec<u8>, std::io::Error>(format!("{}\n", line).into_bytes())];

        let mut events = parse_sse_stream(stream::iter(chunks), ChatChunkParser);
        let first = events.next().await.unwrap().unwrap();
        assert_eq!(first, StreamEvent::Done { finish_reason: Some("stop".to_string()) });
    }

    #[tokio::test]
    async fn test_transport_error_ends_stream() {
        let chunks = vec![
            Ok(b"data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hi\"},\"finish_reason\":null}]}\n".to_vec()),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ];

        let mut events = parse_sse_stream(stream::iter(chunks), ChatChunkParser);
        assert!(matches!(events.next().await, Some(Ok(StreamEvent::Message { .. }))));
        assert!(matches!(events.next().await, Some(Err(crate::LlmError::Stream(_)))));
        assert!(events.next().await.is_none());
    }
}
