use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Draft, DraftVersion, Feedback, Message, NewMessage, OrgScope, Principal, ScheduleFilter,
    ScheduledDraft, Thread, UpsertOutcome,
};

/// Threads and their ordered message log
#[async_trait]
pub trait ThreadStore: Send + Sync {
    async fn create_thread(&self, thread: Thread) -> Result<Thread>;

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>>;

    /// Threads readable by `principal`, most recently updated first
    async fn list_threads(
        &self,
        principal: &Principal,
        scope: &OrgScope,
        limit: Option<i64>,
        skip: Option<u64>,
    ) -> Result<Vec<Thread>>;

    async fn update_thread_title(&self, thread_id: &str, title: &str) -> Result<()>;

    /// Delete a thread with its messages, drafts and versions
    async fn delete_thread(&self, thread_id: &str) -> Result<()>;

    /// Store a message under the next sequence number of its thread
    ///
    /// Allocation is atomic per thread and also touches `updated_at`.
    async fn append_message(&self, message: NewMessage) -> Result<Message>;

    async fn get_message(&self, message_id: &str) -> Result<Option<Message>>;

    /// Messages in sequence order; with `before_sequence` only older ones,
    /// with `limit` only the newest `limit` of those
    async fn list_messages(
        &self,
        thread_id: &str,
        limit: Option<usize>,
        before_sequence: Option<u64>,
    ) -> Result<Vec<Message>>;
}

/// Drafts and their version rows
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn insert_draft(&self, draft: Draft, first: DraftVersion) -> Result<()>;

    async fn get_draft(&self, draft_id: &str) -> Result<Option<Draft>>;

    /// Most recently updated draft of a thread
    async fn active_draft(&self, thread_id: &str) -> Result<Option<Draft>>;

    async fn list_drafts(&self, thread_id: &str) -> Result<Vec<Draft>>;

    /// Conditional insert-or-update keyed on (draft_id, version)
    async fn upsert_version(&self, version: DraftVersion) -> Result<UpsertOutcome>;

    /// Raise `current_version` to `max(current_version, version)`
    async fn advance_current_version(&self, draft_id: &str, version: u32) -> Result<Draft>;

    async fn get_version(&self, draft_id: &str, version: u32) -> Result<Option<DraftVersion>>;

    async fn list_versions(&self, draft_id: &str) -> Result<Vec<DraftVersion>>;

    async fn update_version_content(&self, draft_id: &str, version: u32, content: &str) -> Result<()>;

    async fn set_version_parent(&self, draft_id: &str, version: u32, message_id: &str) -> Result<()>;

    async fn rename_draft(&self, draft_id: &str, title: &str) -> Result<Draft>;

    async fn delete_draft(&self, draft_id: &str) -> Result<()>;
}

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn insert_scheduled(&self, row: ScheduledDraft) -> Result<()>;

    async fn get_scheduled(&self, id: &str) -> Result<Option<ScheduledDraft>>;

    async fn replace_scheduled(&self, row: ScheduledDraft) -> Result<()>;

    async fn delete_scheduled(&self, id: &str) -> Result<()>;

    async fn list_scheduled(&self, user_id: &str, filter: &ScheduleFilter) -> Result<Vec<ScheduledDraft>>;
}

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Insert or replace the row keyed on (user_id, message_id)
    async fn upsert_feedback(&self, feedback: Feedback) -> Result<Feedback>;

    async fn get_feedback(&self, user_id: &str, message_id: &str) -> Result<Option<Feedback>>;

    async fn list_feedback(&self, thread_id: &str) -> Result<Vec<Feedback>>;
}

/// Full storage backend
pub trait PersistenceClient: ThreadStore + DraftStore + ScheduleStore + FeedbackStore {}

impl<T> PersistenceClient for T where T: ThreadStore + DraftStore + ScheduleStore + FeedbackStore {}
