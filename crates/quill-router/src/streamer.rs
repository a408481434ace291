use futures::{Stream, StreamExt};
use quill_llm::{ChatClient, ChatOptions, ChatRequest, EventStream, LlmResult, Message, StreamEvent};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Single-pass sequence of text fragments from the provider
///
/// Ends after the provider's `Done` or after the first error. Dropping it
/// closes the provider connection.
pub struct ResponseStream {
    inner: EventStream,
    finished: bool,
}

impl ResponseStream {
    pub fn new(inner: EventStream) -> Self {
        Self {
            inner,
            finished: false,
        }
    }
}

impl Stream for ResponseStream {
    type Item = LlmResult<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if self.finished {
                return Poll::Ready(None);
            }

            match self.inner.poll_next_unpin(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(None) | Poll::Ready(Some(Ok(StreamEvent::Done { .. }))) => {
                    self.finished = true;
                    return Poll::Ready(None);
                }
                Poll::Ready(Some(Ok(StreamEvent::Message { content }))) => {
                    if content.is_empty() {
                        continue;
                    }
                    return Poll::Ready(Some(Ok(content)));
                }
                Poll::Ready(Some(Err(e))) => {
                    self.finished = true;
                    return Poll::Ready(Some(Err(e)));
                }
            }
        }
    }
}

/// Opens token streams for generation
#[derive(Clone)]
pub struct ResponseStreamer {
    client: Arc<dyn ChatClient>,
    model: String,
    max_tokens: Option<u32>,
}

impl ResponseStreamer {
    pub fn new(client: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, tokens: Option<u32>) -> Self {
        self.max_tokens = tokens;
        self
    }

    /// `messages` must already start with the system prompt
    pub async fn open(&self, messages: Vec<Message>, temperature: Option<f32>) -> LlmResult<ResponseStream> {
        let mut options = ChatOptions::new();
        options.temperature = temperature;
        options.max_tokens = self.max_tokens;

        let request = ChatRequest::new(self.model.clone(), messages).with_options(options);
        let inner = self.client.chat_stream(request).await?;
        Ok(ResponseStream::new(inner))
    }
}
