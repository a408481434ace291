use quill_llm::{Content, Message};
use quill_persist::{Message as StoredMessage, MessageRole};
use tiktoken_rs::{cl100k_base, CoreBPE};

use crate::error::{ContextError, Result};

/// Per-message framing tokens added by chat formats
const MESSAGE_OVERHEAD_TOKENS: usize = 4;

/// Token-bounded tail of a thread's transcript
pub struct HistoryWindow {
    max_tokens: usize,
    bpe: CoreBPE,
}

impl HistoryWindow {
    pub fn new(max_tokens: usize) -> Result<Self> {
        let bpe = cl100k_base().map_err(|e| ContextError::Tokenizer(e.to_string()))?;
        Ok(Self { max_tokens, bpe })
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    pub fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len() + MESSAGE_OVERHEAD_TOKENS
    }

    /// Drop the oldest messages until the rest fit the budget
    ///
    /// The newest message is kept even when it alone exceeds the budget.
    pub fn trim<'a>(&self, messages: &'a [StoredMessage]) -> &'a [StoredMessage] {
        let Some(last) = messages.len().checked_sub(1) else {
            return messages;
        };

        let mut used = self.count_tokens(&messages[last].content);
        let mut start = last;
        while start > 0 {
            let cost = self.count_tokens(&messages[start - 1].content);
            if used + cost > self.max_tokens {
                break;
            }
            used += cost;
            start -= 1;
        }

        &messages[start..]
    }

    /// Trim and convert to provider messages
    pub fn build(&self, messages: &[StoredMessage]) -> Vec<Message> {
        self.trim(messages).iter().map(to_llm_message).collect()
    }
}

fn to_llm_message(message: &StoredMessage) -> Message {
    let content = Content::text(message.content.clone());
    match message.role {
        MessageRole::User => Message::Human { content },
        MessageRole::Assistant => Message::AI { content },
    }
}
