use async_trait::async_trait;
use quill_llm::Message;
use quill_persist::ThreadStore;
use quill_types::Intent;

use crate::assembler::ContextData;
use crate::error::Result;

/// Prompt and history handed to the provider for one turn
#[derive(Debug, Clone)]
pub struct ContextWindow {
    pub system_prompt: String,
    pub messages: Vec<Message>,
}

impl ContextWindow {
    /// System prompt followed by history, ready for a chat request
    pub fn into_messages(self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.messages.len() + 1);
        messages.push(Message::system(self.system_prompt));
        messages.extend(self.messages);
        messages
    }
}

/// Strategy for building the context window of a turn
#[async_trait]
pub trait ContextStrategy: Send + Sync {
    async fn get_context_window(
        &self,
        thread_id: &str,
        intent: Intent,
        data: &ContextData,
        threads: &dyn ThreadStore,
    ) -> Result<ContextWindow>;
}
