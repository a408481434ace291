use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use quill_persist::{
    CalendarDay, NewScheduledDraft, ScheduleFilter, ScheduleStatus, ScheduledDraft,
    ScheduledDraftPatch,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    error::{ApiError, ApiResult},
    extract::Caller,
    routes::threads::org_scope,
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScheduledDraftResponse {
    pub id: String,
    pub user_id: String,
    pub organization_id: Option<String>,
    pub draft_id: Option<String>,
    pub version: Option<u32>,
    pub thread_id: Option<String>,
    pub content: String,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    #[schema(value_type = String, example = "scheduled")]
    pub status: ScheduleStatus,
    pub posted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ScheduledDraft> for ScheduledDraftResponse {
    fn from(row: ScheduledDraft) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            organization_id: row.organization_id,
            draft_id: row.draft_id,
            version: row.version,
            thread_id: row.thread_id,
            content: row.content,
            title: row.title,
            notes: row.notes,
            scheduled_at: row.scheduled_at,
            status: row.status,
            posted_at: row.posted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CalendarDayResponse {
    pub date: NaiveDate,
    pub items: Vec<ScheduledDraftResponse>,
}

impl From<CalendarDay> for CalendarDayResponse {
    fn from(day: CalendarDay) -> Self {
        Self {
            date: day.date,
            items: day.items.into_iter().map(ScheduledDraftResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateScheduledRequest {
    pub content: String,
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ScheduleFromDraftRequest {
    /// Defaults to the draft's current version
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ListScheduledQuery {
    pub status: Option<ScheduleStatus>,
    pub organization_id: Option<String>,
    #[serde(default)]
    pub personal: bool,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    /// IANA zone name, e.g. `Europe/Berlin`
    #[serde(default = "default_tz")]
    pub tz: String,
    pub organization_id: Option<String>,
    #[serde(default)]
    pub personal: bool,
}

fn default_tz() -> String {
    "UTC".to_string()
}

#[utoipa::path(
    post,
    path = "/scheduled",
    request_body = CreateScheduledRequest,
    responses(
        (status = 201, description = "Saved, or scheduled when scheduled_at is set", body = ScheduledDraftResponse),
        (status = 400, description = "Empty content")
    ),
    tag = "scheduled"
)]
pub async fn create_scheduled(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Json(req): Json<CreateScheduledRequest>,
) -> ApiResult<(StatusCode, Json<ScheduledDraftResponse>)> {
    let input = NewScheduledDraft {
        organization_id: req.organization_id,
        content: req.content,
        title: req.title,
        notes: req.notes,
        scheduled_at: req.scheduled_at,
        ..Default::default()
    };

    let row = state.schedule.create(&principal.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// Copy a draft version into the schedule
#[utoipa::path(
    post,
    path = "/drafts/{draft_id}/schedule",
    params(
        ("draft_id" = String, Path, description = "Draft ID")
    ),
    request_body = ScheduleFromDraftRequest,
    responses(
        (status = 201, description = "Scheduled copy created", body = ScheduledDraftResponse),
        (status = 404, description = "Draft or version not found")
    ),
    tag = "scheduled"
)]
pub async fn schedule_from_draft(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Path(draft_id): Path<String>,
    Json(req): Json<ScheduleFromDraftRequest>,
) -> ApiResult<(StatusCode, Json<ScheduledDraftResponse>)> {
    state.readable_draft(&draft_id, &principal).await?;

    let row = state
        .schedule
        .create_from_draft(
            &principal.user_id,
            &draft_id,
            req.version,
            req.organization_id,
            req.scheduled_at,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

#[utoipa::path(
    get,
    path = "/scheduled",
    params(
        ("status" = Option<String>, Query, description = "saved, scheduled or posted"),
        ("organization_id" = Option<String>, Query, description = "Only rows of this organization"),
        ("personal" = Option<bool>, Query, description = "Only rows without an organization")
    ),
    responses(
        (status = 200, description = "Caller's scheduled drafts", body = Vec<ScheduledDraftResponse>)
    ),
    tag = "scheduled"
)]
pub async fn list_scheduled(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Query(query): Query<ListScheduledQuery>,
) -> ApiResult<Json<Vec<ScheduledDraftResponse>>> {
    let filter = ScheduleFilter {
        status: query.status,
        scope: org_scope(query.organization_id, query.personal),
    };

    let rows = state.schedule.list(&principal.user_id, &filter).await?;
    Ok(Json(rows.into_iter().map(ScheduledDraftResponse::from).collect()))
}

/// Scheduled rows grouped by local calendar date
#[utoipa::path(
    get,
    path = "/scheduled/calendar",
    params(
        ("tz" = Option<String>, Query, description = "IANA time zone (default: UTC)"),
        ("organization_id" = Option<String>, Query, description = "Only rows of this organization"),
        ("personal" = Option<bool>, Query, description = "Only rows without an organization")
    ),
    responses(
        (status = 200, description = "Days in ascending order", body = Vec<CalendarDayResponse>),
        (status = 400, description = "Unknown time zone")
    ),
    tag = "scheduled"
)]
pub async fn calendar(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Query(query): Query<CalendarQuery>,
) -> ApiResult<Json<Vec<CalendarDayResponse>>> {
    let tz: Tz = query
        .tz
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("unknown time zone '{}'", query.tz)))?;
    let scope = org_scope(query.organization_id, query.personal);

    let days = state.schedule.calendar(&principal.user_id, tz, scope).await?;
    Ok(Json(days.into_iter().map(CalendarDayResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/scheduled/{id}",
    params(
        ("id" = String, Path, description = "Scheduled draft ID")
    ),
    responses(
        (status = 200, description = "Scheduled draft", body = ScheduledDraftResponse),
        (status = 404, description = "Scheduled draft not found")
    ),
    tag = "scheduled"
)]
pub async fn get_scheduled(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<ScheduledDraftResponse>> {
    let row = state.schedule.get(&principal.user_id, &id).await?;
    Ok(Json(row.into()))
}

/// Partial update; `"scheduled_at": null` clears the schedule
#[utoipa::path(
    patch,
    path = "/scheduled/{id}",
    params(
        ("id" = String, Path, description = "Scheduled draft ID")
    ),
    request_body(content = Object, description = "Any of content, title, notes, scheduled_at, status"),
    responses(
        (status = 200, description = "Updated row", body = ScheduledDraftResponse),
        (status = 400, description = "Invalid transition"),
        (status = 404, description = "Scheduled draft not found")
    ),
    tag = "scheduled"
)]
pub async fn update_scheduled(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Path(id): Path<String>,
    Json(patch): Json<ScheduledDraftPatch>,
) -> ApiResult<Json<ScheduledDraftResponse>> {
    let row = state.schedule.update(&principal.user_id, &id, patch).await?;
    Ok(Json(row.into()))
}

#[utoipa::path(
    delete,
    path = "/scheduled/{id}",
    params(
        ("id" = String, Path, description = "Scheduled draft ID")
    ),
    responses(
        (status = 204, description = "Scheduled draft deleted"),
        (status = 404, description = "Scheduled draft not found")
    ),
    tag = "scheduled"
)]
pub async fn delete_scheduled(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.schedule.delete(&principal.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
