use axum::{
    extract::{Path, Query, State},
    Json,
};
use quill_persist::{Message, MessageRole};
use quill_types::Intent;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{error::ApiResult, extract::Caller, state::AppState};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message_id: String,
    pub thread_id: String,
    #[schema(value_type = String, example = "assistant")]
    pub role: MessageRole,
    pub content: String,
    #[schema(value_type = Option<String>, example = "draft")]
    pub intent: Option<Intent>,
    pub sequence: u64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            message_id: message.id,
            thread_id: message.thread_id,
            role: message.role,
            content: message.content,
            intent: message.intent,
            sequence: message.sequence,
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListMessagesQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Only messages with a lower sequence number
    pub before: Option<u64>,
}

fn default_limit() -> usize {
    50
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListMessagesResponse {
    pub messages: Vec<MessageResponse>,
    pub has_more: bool,
}

/// List messages in a thread, oldest first
#[utoipa::path(
    get,
    path = "/threads/{thread_id}/messages",
    params(
        ("thread_id" = String, Path, description = "Thread ID"),
        ("limit" = Option<usize>, Query, description = "Maximum number of messages (default: 50)"),
        ("before" = Option<u64>, Query, description = "Get messages before this sequence number")
    ),
    responses(
        (status = 200, description = "List of messages", body = ListMessagesResponse),
        (status = 404, description = "Thread not found")
    ),
    tag = "messages"
)]
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Path(thread_id): Path<String>,
    Query(query): Query<ListMessagesQuery>,
) -> ApiResult<Json<ListMessagesResponse>> {
    state.threads.get_thread(&thread_id, &principal).await?;

    let limit = query.limit.clamp(1, 100);
    let messages = state
        .threads
        .list_messages(&thread_id, Some(limit), query.before)
        .await?;

    let has_more = messages.len() == limit;
    Ok(Json(ListMessagesResponse {
        messages: messages.into_iter().map(MessageResponse::from).collect(),
        has_more,
    }))
}
