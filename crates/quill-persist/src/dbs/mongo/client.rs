use async_trait::async_trait;
use mongodb::Client;
use tracing::info;

use crate::dbs::mongo::repositories::{
    MongoDraftRepository, MongoFeedbackRepository, MongoMessageRepository,
    MongoScheduledRepository, MongoThreadRepository,
};
use crate::error::{PersistError, Result};
use crate::models::{
    Draft, DraftVersion, Feedback, Message, NewMessage, OrgScope, Principal, ScheduleFilter,
    ScheduledDraft, Thread, UpsertOutcome,
};
use crate::trait_client::{DraftStore, FeedbackStore, ScheduleStore, ThreadStore};

pub struct MongoPersistenceClient {
    thread_repo: MongoThreadRepository,
    message_repo: MongoMessageRepository,
    draft_repo: MongoDraftRepository,
    scheduled_repo: MongoScheduledRepository,
    feedback_repo: MongoFeedbackRepository,
}

impl MongoPersistenceClient {
    /// Connect to MongoDB and make sure the unique indexes exist
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        let this = Self {
            thread_repo: MongoThreadRepository::new(&client, database),
            message_repo: MongoMessageRepository::new(&client, database),
            draft_repo: MongoDraftRepository::new(&client, database),
            scheduled_repo: MongoScheduledRepository::new(&client, database),
            feedback_repo: MongoFeedbackRepository::new(&client, database),
        };

        this.thread_repo.ensure_indexes().await?;
        this.message_repo.ensure_indexes().await?;
        this.draft_repo.ensure_indexes().await?;
        this.scheduled_repo.ensure_indexes().await?;
        this.feedback_repo.ensure_indexes().await?;
        info!(database = %database, "Connected to MongoDB");

        Ok(this)
    }
}

#[async_trait]
impl ThreadStore for MongoPersistenceClient {
    async fn create_thread(&self, thread: Thread) -> Result<Thread> {
        self.thread_repo.create_thread(thread).await
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        self.thread_repo.get_thread(thread_id).await
    }

    async fn list_threads(
        &self,
        principal: &Principal,
        scope: &OrgScope,
        limit: Option<i64>,
        skip: Option<u64>,
    ) -> Result<Vec<Thread>> {
        self.thread_repo
            .list_threads(principal, scope, limit, skip)
            .await
    }

    async fn update_thread_title(&self, thread_id: &str, title: &str) -> Result<()> {
        self.thread_repo.update_title(thread_id, title).await
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        self.thread_repo.delete_thread(thread_id).await?;
        self.message_repo.delete_for_thread(thread_id).await?;
        self.draft_repo.delete_for_thread(thread_id).await
    }

    async fn append_message(&self, message: NewMessage) -> Result<Message> {
        let sequence = self.thread_repo.allocate_sequence(&message.thread_id).await?;
        let message = message.into_message(sequence);
        self.message_repo.save_message(&message).await?;
        Ok(message)
    }

    async fn get_message(&self, message_id: &str) -> Result<Option<Message>> {
        self.message_repo.get_message(message_id).await
    }

    async fn list_messages(
        &self,
        thread_id: &str,
        limit: Option<usize>,
        before_sequence: Option<u64>,
    ) -> Result<Vec<Message>> {
        self.message_repo
            .get_messages(thread_id, limit, before_sequence)
            .await
    }
}

#[async_trait]
impl DraftStore for MongoPersistenceClient {
    async fn insert_draft(&self, draft: Draft, first: DraftVersion) -> Result<()> {
        self.draft_repo.insert_draft(&draft, &first).await
    }

    async fn get_draft(&self, draft_id: &str) -> Result<Option<Draft>> {
        self.draft_repo.get_draft(draft_id).await
    }

    async fn active_draft(&self, thread_id: &str) -> Result<Option<Draft>> {
        self.draft_repo.active_draft(thread_id).await
    }

    async fn list_drafts(&self, thread_id: &str) -> Result<Vec<Draft>> {
        self.draft_repo.list_drafts(thread_id).await
    }

    async fn upsert_version(&self, version: DraftVersion) -> Result<UpsertOutcome> {
        self.draft_repo.upsert_version(&version).await
    }

    async fn advance_current_version(&self, draft_id: &str, version: u32) -> Result<Draft> {
        self.draft_repo
            .advance_current_version(draft_id, version)
            .await
    }

    async fn get_version(&self, draft_id: &str, version: u32) -> Result<Option<DraftVersion>> {
        self.draft_repo.get_version(draft_id, version).await
    }

    async fn list_versions(&self, draft_id: &str) -> Result<Vec<DraftVersion>> {
        self.draft_repo.list_versions(draft_id).await
    }

    async fn update_version_content(&self, draft_id: &str, version: u32, content: &str) -> Result<()> {
        self.draft_repo
            .set_version_field(draft_id, version, "content", content)
            .await
    }

    async fn set_version_parent(&self, draft_id: &str, version: u32, message_id: &str) -> Result<()> {
        self.draft_repo
            .set_version_field(draft_id, version, "parent_message_id", message_id)
            .await
    }

    async fn rename_draft(&self, draft_id: &str, title: &str) -> Result<Draft> {
        self.draft_repo.rename_draft(draft_id, title).await
    }

    async fn delete_draft(&self, draft_id: &str) -> Result<()> {
        self.draft_repo.delete_draft(draft_id).await
    }
}

#[async_trait]
impl ScheduleStore for MongoPersistenceClient {
    async fn insert_scheduled(&self, row: ScheduledDraft) -> Result<()> {
        self.scheduled_repo.insert(&row).await
    }

    async fn get_scheduled(&self, id: &str) -> Result<Option<ScheduledDraft>> {
        self.scheduled_repo.get(id).await
    }

    async fn replace_scheduled(&self, row: ScheduledDraft) -> Result<()> {
        self.scheduled_repo.replace(&row).await
    }

    async fn delete_scheduled(&self, id: &str) -> Result<()> {
        self.scheduled_repo.delete(id).await
    }

    async fn list_scheduled(&self, user_id: &str, filter: &ScheduleFilter) -> Result<Vec<ScheduledDraft>> {
        self.scheduled_repo.list(user_id, filter).await
    }
}

#[async_trait]
impl FeedbackStore for MongoPersistenceClient {
    async fn upsert_feedback(&self, feedback: Feedback) -> Result<Feedback> {
        self.feedback_repo.upsert(&feedback).await?;
        Ok(feedback)
    }

    async fn get_feedback(&self, user_id: &str, message_id: &str) -> Result<Option<Feedback>> {
        self.feedback_repo.get(user_id, message_id).await
    }

    async fn list_feedback(&self, thread_id: &str) -> Result<Vec<Feedback>> {
        self.feedback_repo.list_for_thread(thread_id).await
    }
}
