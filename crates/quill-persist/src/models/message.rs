use chrono::{DateTime, Utc};
use quill_types::Intent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Immutable transcript entry; `sequence` is allocated by the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub thread_id: String,
    pub role: MessageRole,
    pub content: String,
    pub intent: Option<Intent>,
    pub sequence: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub thread_id: String,
    pub role: MessageRole,
    pub content: String,
    pub intent: Option<Intent>,
}

impl NewMessage {
    pub fn user(thread_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            role: MessageRole::User,
            content: content.into(),
            intent: None,
        }
    }

    pub fn assistant(thread_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            role: MessageRole::Assistant,
            content: content.into(),
            intent: None,
        }
    }

    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.intent = Some(intent);
        self
    }

    pub(crate) fn into_message(self, sequence: u64) -> Message {
        Message {
            id: uuid::Uuid::new_v4().to_string(),
            thread_id: self.thread_id,
            role: self.role,
            content: self.content,
            intent: self.intent,
            sequence,
            created_at: Utc::now(),
        }
    }
}
