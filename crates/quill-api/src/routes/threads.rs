use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use quill_persist::{OrgScope, Thread};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{error::ApiResult, extract::Caller, state::AppState};

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateThreadRequest {
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateThreadRequest {
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ThreadResponse {
    pub thread_id: String,
    pub user_id: String,
    pub organization_id: Option<String>,
    pub title: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Thread> for ThreadResponse {
    fn from(thread: Thread) -> Self {
        Self {
            thread_id: thread.id,
            user_id: thread.user_id,
            organization_id: thread.organization_id,
            title: thread.title,
            created_at: thread.created_at,
            updated_at: thread.updated_at,
        }
    }
}

/// Organization filter shared by listing endpoints
///
/// `personal=true` wins over `organization_id`; neither means any scope.
pub fn org_scope(organization_id: Option<String>, personal: bool) -> OrgScope {
    match (organization_id, personal) {
        (_, true) => OrgScope::Personal,
        (Some(org), false) => OrgScope::Organization(org),
        (None, false) => OrgScope::Any,
    }
}

#[derive(Debug, Deserialize)]
pub struct ListThreadsQuery {
    pub organization_id: Option<String>,
    #[serde(default)]
    pub personal: bool,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub skip: u64,
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListThreadsResponse {
    pub threads: Vec<ThreadResponse>,
    pub has_more: bool,
}

/// Create a new thread
#[utoipa::path(
    post,
    path = "/threads",
    request_body = CreateThreadRequest,
    responses(
        (status = 201, description = "Thread created", body = ThreadResponse),
        (status = 400, description = "Invalid request")
    ),
    tag = "threads"
)]
pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Json(req): Json<CreateThreadRequest>,
) -> ApiResult<(StatusCode, Json<ThreadResponse>)> {
    let thread = state
        .threads
        .create_thread(&principal, req.organization_id, req.title)
        .await?;

    Ok((StatusCode::CREATED, Json(thread.into())))
}

/// List threads visible to the caller
#[utoipa::path(
    get,
    path = "/threads",
    params(
        ("organization_id" = Option<String>, Query, description = "Only threads of this organization"),
        ("personal" = Option<bool>, Query, description = "Only threads without an organization"),
        ("limit" = Option<i64>, Query, description = "Maximum number of threads to return (default: 20)"),
        ("skip" = Option<u64>, Query, description = "Number of threads to skip")
    ),
    responses(
        (status = 200, description = "List of threads", body = ListThreadsResponse)
    ),
    tag = "threads"
)]
pub async fn list_threads(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Query(query): Query<ListThreadsQuery>,
) -> ApiResult<Json<ListThreadsResponse>> {
    let limit = query.limit.clamp(1, 100);

    let scope = org_scope(query.organization_id, query.personal);

    let threads = state
        .threads
        .list_threads(&principal, &scope, Some(limit), Some(query.skip))
        .await?;

    let has_more = threads.len() as i64 == limit;
    Ok(Json(ListThreadsResponse {
        threads: threads.into_iter().map(ThreadResponse::from).collect(),
        has_more,
    }))
}

/// Get a specific thread by ID
#[utoipa::path(
    get,
    path = "/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "Thread details", body = ThreadResponse),
        (status = 404, description = "Thread not found")
    ),
    tag = "threads"
)]
pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<ThreadResponse>> {
    let thread = state.threads.get_thread(&thread_id, &principal).await?;
    Ok(Json(thread.into()))
}

/// Rename a thread (owner only)
#[utoipa::path(
    patch,
    path = "/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    request_body = UpdateThreadRequest,
    responses(
        (status = 200, description = "Thread renamed", body = ThreadResponse),
        (status = 400, description = "Empty title"),
        (status = 404, description = "Thread not found")
    ),
    tag = "threads"
)]
pub async fn update_thread(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Path(thread_id): Path<String>,
    Json(req): Json<UpdateThreadRequest>,
) -> ApiResult<Json<ThreadResponse>> {
    let thread = state
        .threads
        .update_title(&thread_id, &principal, &req.title)
        .await?;
    Ok(Json(thread.into()))
}

/// Delete a thread with its messages and drafts (owner only)
#[utoipa::path(
    delete,
    path = "/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 204, description = "Thread deleted"),
        (status = 404, description = "Thread not found")
    ),
    tag = "threads"
)]
pub async fn delete_thread(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Path(thread_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.threads.delete_thread(&thread_id, &principal).await?;
    Ok(StatusCode::NO_CONTENT)
}
