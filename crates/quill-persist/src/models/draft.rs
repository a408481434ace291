use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Versioned content artifact produced by draft/edit turns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    pub id: String,
    pub thread_id: String,
    pub title: String,
    /// Always names an existing `DraftVersion::version`
    pub current_version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftVersion {
    pub draft_id: String,
    pub version: u32,
    pub content: String,
    pub edit_prompt: Option<String>,
    pub changes: Option<Vec<String>>,
    pub parent_message_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for a new version row
#[derive(Debug, Clone, Default)]
pub struct NewVersion {
    pub content: String,
    pub edit_prompt: Option<String>,
    pub changes: Option<Vec<String>>,
    pub parent_message_id: Option<String>,
}

impl NewVersion {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn edit_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.edit_prompt = Some(prompt.into());
        self
    }

    pub fn changes(mut self, changes: Vec<String>) -> Self {
        self.changes = Some(changes);
        self
    }

    pub fn parent_message(mut self, message_id: impl Into<String>) -> Self {
        self.parent_message_id = Some(message_id.into());
        self
    }

    pub(crate) fn into_version(self, draft_id: &str, version: u32) -> DraftVersion {
        DraftVersion {
            draft_id: draft_id.to_string(),
            version,
            content: self.content,
            edit_prompt: self.edit_prompt,
            changes: self.changes,
            parent_message_id: self.parent_message_id,
            created_at: Utc::now(),
        }
    }
}

/// A draft together with the version an operation produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRevision {
    pub draft: Draft,
    pub version: DraftVersion,
}

/// Result of a conditional insert-or-update on (draft_id, version)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    /// Row already existed; a concurrent writer got there first
    Updated,
}
