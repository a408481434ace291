use quill_persist::{
    DraftService, FeedbackService, PersistError, Principal, ScheduleService, Stores, Thread,
    ThreadService,
};
use quill_router::TurnPipeline;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{ApiError, ApiResult};

/// Shared application state passed to all handlers
///
/// The services are cheap clones over the same store handles; the pipeline
/// is built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub threads: ThreadService,
    pub drafts: DraftService,
    pub schedule: ScheduleService,
    pub feedback: FeedbackService,
    pub pipeline: Arc<TurnPipeline>,
}

impl AppState {
    pub fn new(config: Config, stores: Stores, pipeline: TurnPipeline) -> Self {
        Self {
            config: Arc::new(config),
            threads: stores.thread_service(),
            drafts: stores.draft_service(),
            schedule: stores.schedule_service(),
            feedback: stores.feedback_service(),
            pipeline: Arc::new(pipeline),
        }
    }

    /// Fetch a draft whose thread the caller may read
    pub async fn readable_draft(
        &self,
        draft_id: &str,
        principal: &Principal,
    ) -> ApiResult<quill_persist::Draft> {
        let draft = self.drafts.get(draft_id).await?;
        let access = self.threads.get_thread(&draft.thread_id, principal).await;
        draft_access(draft_id, access)?;
        Ok(draft)
    }

    /// Fetch a draft whose thread the caller owns; organization readers get 404
    pub async fn owned_draft(
        &self,
        draft_id: &str,
        principal: &Principal,
    ) -> ApiResult<quill_persist::Draft> {
        let draft = self.drafts.get(draft_id).await?;
        let access = self.threads.owned_thread(&draft.thread_id, principal).await;
        draft_access(draft_id, access)?;
        Ok(draft)
    }
}

fn draft_access(draft_id: &str, access: Result<Thread, PersistError>) -> ApiResult<()> {
    match access {
        Ok(_) => Ok(()),
        Err(e) if e.is_not_found() => Err(ApiError::NotFound(format!("draft {}", draft_id))),
        Err(e) => Err(ApiError::Persist(e)),
    }
}
