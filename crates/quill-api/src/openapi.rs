use axum::Json;
use utoipa::OpenApi;

use crate::handlers::stream;
use crate::routes::{drafts, feedback, health, messages, scheduled, threads};

#[derive(OpenApi)]
#[openapi(
    info(title = "Quill API", description = "Threads, streaming turns, drafts and the post schedule"),
    paths(
        health::health_check,
        threads::create_thread,
        threads::list_threads,
        threads::get_thread,
        threads::update_thread,
        threads::delete_thread,
        messages::list_messages,
        stream::send_message_stream,
        drafts::list_drafts,
        drafts::get_draft,
        drafts::rename_draft,
        drafts::delete_draft,
        drafts::list_versions,
        drafts::append_version,
        drafts::get_version,
        drafts::overwrite_version,
        scheduled::create_scheduled,
        scheduled::schedule_from_draft,
        scheduled::list_scheduled,
        scheduled::calendar,
        scheduled::get_scheduled,
        scheduled::update_scheduled,
        scheduled::delete_scheduled,
        feedback::submit_feedback,
        feedback::get_feedback,
        feedback::list_thread_feedback,
    ),
    components(schemas(
        health::HealthResponse,
        threads::CreateThreadRequest,
        threads::UpdateThreadRequest,
        threads::ThreadResponse,
        threads::ListThreadsResponse,
        messages::MessageResponse,
        messages::ListMessagesResponse,
        stream::SendMessageRequest,
        stream::ContextPayload,
        drafts::DraftResponse,
        drafts::VersionResponse,
        drafts::RevisionResponse,
        drafts::AppendVersionRequest,
        drafts::OverwriteVersionRequest,
        drafts::RenameDraftRequest,
        scheduled::ScheduledDraftResponse,
        scheduled::CalendarDayResponse,
        scheduled::CreateScheduledRequest,
        scheduled::ScheduleFromDraftRequest,
        feedback::SubmitFeedbackRequest,
        feedback::FeedbackResponse,
    )),
    tags(
        (name = "health"),
        (name = "threads"),
        (name = "messages"),
        (name = "drafts"),
        (name = "scheduled"),
        (name = "feedback"),
    )
)]
pub struct ApiDoc;

/// Serve the generated OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
