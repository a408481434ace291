use futures::{Stream, StreamExt};
use std::fmt::Display;

use super::buffering::CircularLineBuffer;
use crate::error::{LlmError, LlmResult};
use crate::streaming::StreamEvent;
use crate::traits::EventStream;

/// Strategy for turning SSE `data:` payloads into stream events
pub trait SseLineParser: Send {
    /// Parse a data line into stream events
    fn parse_data_line(&self, data: &str) -> LlmResult<Vec<StreamEvent>>;
    
    /// Check if this line signals end of stream
    fn is_done_marker(&self, data: &str) -> bool {
        data == "[DONE]"
    }
}

/// Generic SSE stream parser over any chunked byte stream
pub fn parse_sse_stream<S, B, E, P>(byte_stream: S, parser: P) -> EventStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: Display + Send,
    P: SseLineParser + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(byte_stream);
        let mut buffer = CircularLineBuffer::with_capacity(4096);
        
        'outer: while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    buffer.extend(bytes.as_ref());
                    
                    while let Some(line_result) = buffer.next_line() {
                        match line_result {
                            Ok(line) => {
                                if line.is_empty() {
                                    continue;
                                }
                                
                                if let Some(data) = line.strip_prefix("data:") {
                                    let data = data.trim_start();
                                    if parser.is_done_marker(data) {
                                        yield Ok(StreamEvent::Done { finish_reason: None });
                                        break 'outer;
                                    }
                                    
                                    match parser.parse_data_line(data) {
                                        Ok(events) => {
                                            for event in events {
                                                yield Ok(event);
                                            }
                                        }
                                        Err(e) => yield Err(e),
                                    }
                                }
                            }
                            Err(e) => yield Err(e),
                        }
                    }
                }
                Err(e) => {
                    yield Err(LlmError::Stream(e.to_string()));
                    break;
                }
            }
        }
    })
}
