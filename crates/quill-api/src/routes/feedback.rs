use axum::{
    extract::{Path, State},
    Json,
};
use quill_persist::{Feedback, FeedbackKind, Principal};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    error::{ApiError, ApiResult},
    extract::Caller,
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitFeedbackRequest {
    #[schema(value_type = String, example = "up")]
    pub kind: FeedbackKind,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FeedbackResponse {
    pub user_id: String,
    pub message_id: String,
    pub thread_id: String,
    #[schema(value_type = String, example = "up")]
    pub kind: FeedbackKind,
    pub text: Option<String>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Feedback> for FeedbackResponse {
    fn from(feedback: Feedback) -> Self {
        Self {
            user_id: feedback.user_id,
            message_id: feedback.message_id,
            thread_id: feedback.thread_id,
            kind: feedback.kind,
            text: feedback.text,
            updated_at: feedback.updated_at,
        }
    }
}

/// Rate a message; a second rating by the same user replaces the first
#[utoipa::path(
    put,
    path = "/messages/{message_id}/feedback",
    params(
        ("message_id" = String, Path, description = "Message ID")
    ),
    request_body = SubmitFeedbackRequest,
    responses(
        (status = 200, description = "Stored feedback", body = FeedbackResponse),
        (status = 404, description = "Message not found")
    ),
    tag = "feedback"
)]
pub async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Path(message_id): Path<String>,
    Json(req): Json<SubmitFeedbackRequest>,
) -> ApiResult<Json<FeedbackResponse>> {
    readable_message(&state, &message_id, &principal).await?;

    let feedback = state
        .feedback
        .submit(&principal.user_id, &message_id, req.kind, req.text)
        .await?;
    Ok(Json(feedback.into()))
}

#[utoipa::path(
    get,
    path = "/messages/{message_id}/feedback",
    params(
        ("message_id" = String, Path, description = "Message ID")
    ),
    responses(
        (status = 200, description = "Caller's feedback on the message", body = FeedbackResponse),
        (status = 404, description = "No feedback recorded")
    ),
    tag = "feedback"
)]
pub async fn get_feedback(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Path(message_id): Path<String>,
) -> ApiResult<Json<FeedbackResponse>> {
    readable_message(&state, &message_id, &principal).await?;

    let feedback = state
        .feedback
        .get(&principal.user_id, &message_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("feedback on message {}", message_id)))?;
    Ok(Json(feedback.into()))
}

#[utoipa::path(
    get,
    path = "/threads/{thread_id}/feedback",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "All feedback in the thread", body = Vec<FeedbackResponse>),
        (status = 404, description = "Thread not found")
    ),
    tag = "feedback"
)]
pub async fn list_thread_feedback(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<Vec<FeedbackResponse>>> {
    state.threads.get_thread(&thread_id, &principal).await?;
    let feedback = state.feedback.list_for_thread(&thread_id).await?;
    Ok(Json(feedback.into_iter().map(FeedbackResponse::from).collect()))
}

async fn readable_message(state: &AppState, message_id: &str, principal: &Principal) -> ApiResult<()> {
    let message = state.threads.get_message(message_id).await?;
    state
        .threads
        .get_thread(&message.thread_id, principal)
        .await
        .map_err(|_| ApiError::NotFound(format!("message {}", message_id)))?;
    Ok(())
}
