use serde::{Deserialize, Serialize};

use crate::intent::Intent;

/// Where a piece of streamed text is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Chat bubble in the transcript
    Conversation,
    /// Editable draft preview
    Draft,
}

/// User-visible failure categories for a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Auth,
    RateLimited,
    Provider,
    NotFound,
    Internal,
}

/// Summary of a finished turn and the rows it produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedTurn {
    pub text: String,
    pub channel: Channel,
    pub message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

/// Events emitted while a chat turn is processed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    /// Turn accepted and user message stored
    TurnStarted {
        turn_id: String,
        thread_id: String,
        user_message_id: String,
        timestamp: i64,
    },

    /// Classifier decision for this turn
    Intent {
        intent: Intent,
    },

    /// Streamed text routed to a channel
    Delta {
        content: String,
        channel: Channel,
        is_final: bool,
    },

    /// Discard everything rendered in the draft preview so far
    ClearDraftPreview,

    /// Turn finished and persisted
    Completed(CompletedTurn),

    /// Turn aborted
    Error {
        kind: ErrorKind,
        message: String,
    },
}

impl TurnEvent {
    pub fn delta(content: impl Into<String>, channel: Channel) -> Self {
        Self::Delta {
            content: content.into(),
            channel,
            is_final: false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Error { .. })
    }
}
