use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Up,
    Down,
}

/// Rating of one assistant message, unique per (user, message)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub user_id: String,
    pub message_id: String,
    pub thread_id: String,
    pub kind: FeedbackKind,
    pub text: Option<String>,
    pub updated_at: DateTime<Utc>,
}
