use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use quill_persist::{Draft, DraftRevision, DraftVersion, NewVersion};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{error::ApiResult, extract::Caller, state::AppState};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DraftResponse {
    pub draft_id: String,
    pub thread_id: String,
    pub title: String,
    pub current_version: u32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Draft> for DraftResponse {
    fn from(draft: Draft) -> Self {
        Self {
            draft_id: draft.id,
            thread_id: draft.thread_id,
            title: draft.title,
            current_version: draft.current_version,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VersionResponse {
    pub draft_id: String,
    pub version: u32,
    pub content: String,
    pub edit_prompt: Option<String>,
    pub changes: Option<Vec<String>>,
    pub parent_message_id: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<DraftVersion> for VersionResponse {
    fn from(version: DraftVersion) -> Self {
        Self {
            draft_id: version.draft_id,
            version: version.version,
            content: version.content,
            edit_prompt: version.edit_prompt,
            changes: version.changes,
            parent_message_id: version.parent_message_id,
            created_at: version.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RevisionResponse {
    pub draft: DraftResponse,
    pub version: VersionResponse,
}

impl From<DraftRevision> for RevisionResponse {
    fn from(revision: DraftRevision) -> Self {
        Self {
            draft: revision.draft.into(),
            version: revision.version.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AppendVersionRequest {
    pub content: String,
    #[serde(default)]
    pub edit_prompt: Option<String>,
    #[serde(default)]
    pub changes: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OverwriteVersionRequest {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RenameDraftRequest {
    pub title: String,
}

/// List the drafts of a thread, most recently updated first
#[utoipa::path(
    get,
    path = "/threads/{thread_id}/drafts",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "Drafts of the thread", body = Vec<DraftResponse>),
        (status = 404, description = "Thread not found")
    ),
    tag = "drafts"
)]
pub async fn list_drafts(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<Vec<DraftResponse>>> {
    state.threads.get_thread(&thread_id, &principal).await?;
    let drafts = state.drafts.list_for_thread(&thread_id).await?;
    Ok(Json(drafts.into_iter().map(DraftResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/drafts/{draft_id}",
    params(
        ("draft_id" = String, Path, description = "Draft ID")
    ),
    responses(
        (status = 200, description = "Draft details", body = DraftResponse),
        (status = 404, description = "Draft not found")
    ),
    tag = "drafts"
)]
pub async fn get_draft(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Path(draft_id): Path<String>,
) -> ApiResult<Json<DraftResponse>> {
    let draft = state.readable_draft(&draft_id, &principal).await?;
    Ok(Json(draft.into()))
}

#[utoipa::path(
    patch,
    path = "/drafts/{draft_id}",
    params(
        ("draft_id" = String, Path, description = "Draft ID")
    ),
    request_body = RenameDraftRequest,
    responses(
        (status = 200, description = "Draft renamed", body = DraftResponse),
        (status = 400, description = "Empty title"),
        (status = 404, description = "Draft not found")
    ),
    tag = "drafts"
)]
pub async fn rename_draft(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Path(draft_id): Path<String>,
    Json(req): Json<RenameDraftRequest>,
) -> ApiResult<Json<DraftResponse>> {
    state.owned_draft(&draft_id, &principal).await?;
    let draft = state.drafts.rename(&draft_id, &req.title).await?;
    Ok(Json(draft.into()))
}

#[utoipa::path(
    delete,
    path = "/drafts/{draft_id}",
    params(
        ("draft_id" = String, Path, description = "Draft ID")
    ),
    responses(
        (status = 204, description = "Draft and its versions deleted"),
        (status = 404, description = "Draft not found")
    ),
    tag = "drafts"
)]
pub async fn delete_draft(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Path(draft_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.owned_draft(&draft_id, &principal).await?;
    state.drafts.delete(&draft_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/drafts/{draft_id}/versions",
    params(
        ("draft_id" = String, Path, description = "Draft ID")
    ),
    responses(
        (status = 200, description = "Versions in ascending order", body = Vec<VersionResponse>),
        (status = 404, description = "Draft not found")
    ),
    tag = "drafts"
)]
pub async fn list_versions(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Path(draft_id): Path<String>,
) -> ApiResult<Json<Vec<VersionResponse>>> {
    state.readable_draft(&draft_id, &principal).await?;
    let versions = state.drafts.list_versions(&draft_id).await?;
    Ok(Json(versions.into_iter().map(VersionResponse::from).collect()))
}

/// Add a version on top of the current one
#[utoipa::path(
    post,
    path = "/drafts/{draft_id}/versions",
    params(
        ("draft_id" = String, Path, description = "Draft ID")
    ),
    request_body = AppendVersionRequest,
    responses(
        (status = 201, description = "Version appended", body = RevisionResponse),
        (status = 404, description = "Draft not found")
    ),
    tag = "drafts"
)]
pub async fn append_version(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Path(draft_id): Path<String>,
    Json(req): Json<AppendVersionRequest>,
) -> ApiResult<(StatusCode, Json<RevisionResponse>)> {
    state.owned_draft(&draft_id, &principal).await?;

    let mut next = NewVersion::new(req.content);
    if let Some(prompt) = req.edit_prompt {
        next = next.edit_prompt(prompt);
    }
    if let Some(changes) = req.changes {
        next = next.changes(changes);
    }

    let revision = state.drafts.append_version(&draft_id, next).await?;
    Ok((StatusCode::CREATED, Json(revision.into())))
}

#[utoipa::path(
    get,
    path = "/drafts/{draft_id}/versions/{version}",
    params(
        ("draft_id" = String, Path, description = "Draft ID"),
        ("version" = u32, Path, description = "Version number")
    ),
    responses(
        (status = 200, description = "Version details", body = VersionResponse),
        (status = 404, description = "Draft or version not found")
    ),
    tag = "drafts"
)]
pub async fn get_version(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Path((draft_id, version)): Path<(String, u32)>,
) -> ApiResult<Json<VersionResponse>> {
    state.readable_draft(&draft_id, &principal).await?;
    let version = state.drafts.get_version(&draft_id, version).await?;
    Ok(Json(version.into()))
}

/// Replace a version's content in place; the current version is unchanged
#[utoipa::path(
    put,
    path = "/drafts/{draft_id}/versions/{version}",
    params(
        ("draft_id" = String, Path, description = "Draft ID"),
        ("version" = u32, Path, description = "Version number")
    ),
    request_body = OverwriteVersionRequest,
    responses(
        (status = 200, description = "Version overwritten", body = VersionResponse),
        (status = 404, description = "Draft or version not found")
    ),
    tag = "drafts"
)]
pub async fn overwrite_version(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Path((draft_id, version)): Path<(String, u32)>,
    Json(req): Json<OverwriteVersionRequest>,
) -> ApiResult<Json<VersionResponse>> {
    state.owned_draft(&draft_id, &principal).await?;
    let version = state
        .drafts
        .overwrite_version(&draft_id, Some(version), &req.content)
        .await?;
    Ok(Json(version.into()))
}
