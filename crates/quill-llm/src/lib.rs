pub mod types;
pub mod traits;
pub mod streaming;
pub mod buffer_utils;
pub mod openai;
pub mod config;
pub mod error;

pub use traits::{
    ChatClient,
    ChatRequest, ChatResponse, ChatOptions,
    EventStream, ResponseFormat, TokenUsage,
};

pub use streaming::{StreamEvent, collect_text};
pub use buffer_utils::CircularLineBuffer;
pub use openai::OpenAIClient;
pub use config::{ClientFactory, OpenAIConfig, ProviderConfig, ProviderType};
pub use error::{LlmError, LlmResult};
pub use types::{Message, Content};
