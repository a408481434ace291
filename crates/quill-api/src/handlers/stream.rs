use axum::{
    extract::{Path, State},
    response::sse::{Event, Sse},
    Json,
};
use futures::stream::{Stream, StreamExt};
use quill_context::ContextData;
use quill_router::{TurnEvent, TurnInput};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;
use utoipa::ToSchema;

use crate::{error::ApiResult, extract::Caller, state::AppState};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SendMessageRequest {
    pub content: String,
    #[serde(default)]
    pub context: Option<ContextPayload>,
}

/// Optional account context folded into the system prompt
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct ContextPayload {
    pub summary: Option<String>,
    pub demographics: Option<String>,
    pub recent_posts: Option<String>,
    pub engagement_notes: Option<String>,
}

impl From<ContextPayload> for ContextData {
    fn from(payload: ContextPayload) -> Self {
        ContextData {
            summary: payload.summary,
            demographics: payload.demographics,
            recent_posts: payload.recent_posts,
            engagement_notes: payload.engagement_notes,
            current_draft: None,
        }
    }
}

/// Send a message and stream the turn using Server-Sent Events
///
/// Event names: `turn_started`, `intent`, `delta`, `clear_draft`,
/// `completed`, `error`. Each payload is the JSON form of the turn event.
#[utoipa::path(
    post,
    path = "/threads/{thread_id}/messages",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Streaming response", content_type = "text/event-stream"),
        (status = 404, description = "Thread not found")
    ),
    tag = "messages"
)]
pub async fn send_message_stream(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Path(thread_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    // Only the owner may post; resolved up front so a miss is a plain 404
    let thread = state.threads.owned_thread(&thread_id, &principal).await?;

    let receiver = state.pipeline.spawn_turn(TurnInput {
        thread_id: thread.id,
        principal,
        content: req.content,
        context: req.context.map(ContextData::from).unwrap_or_default(),
    });

    // Dropping the SSE body drops the receiver, which cancels the turn
    let sse_stream = ReceiverStream::new(receiver).map(|event| Ok(to_sse_event(&event)));

    Ok(Sse::new(sse_stream))
}

fn event_name(event: &TurnEvent) -> &'static str {
    match event {
        TurnEvent::TurnStarted { .. } => "turn_started",
        TurnEvent::Intent { .. } => "intent",
        TurnEvent::Delta { .. } => "delta",
        TurnEvent::ClearDraftPreview => "clear_draft",
        TurnEvent::Completed(_) => "completed",
        TurnEvent::Error { .. } => "error",
    }
}

fn to_sse_event(event: &TurnEvent) -> Event {
    Event::default()
        .event(event_name(event))
        .json_data(event)
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to encode turn event");
            Event::default().event("error").data("event encoding failed")
        })
}
