use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{PersistError, Result};
use crate::models::{title_from, Draft, DraftRevision, DraftVersion, NewVersion, UpsertOutcome};
use crate::trait_client::{DraftStore, ThreadStore};

const TITLE_MAX_CHARS: usize = 80;
const UNTITLED: &str = "Untitled draft";

/// Draft and version lifecycle on top of the stores
#[derive(Clone)]
pub struct DraftService {
    threads: Arc<dyn ThreadStore>,
    drafts: Arc<dyn DraftStore>,
}

impl DraftService {
    pub fn new(threads: Arc<dyn ThreadStore>, drafts: Arc<dyn DraftStore>) -> Self {
        Self { threads, drafts }
    }

    /// Create a draft with version 1
    pub async fn create(
        &self,
        thread_id: &str,
        title: Option<String>,
        first: NewVersion,
    ) -> Result<DraftRevision> {
        if self.threads.get_thread(thread_id).await?.is_none() {
            return Err(PersistError::ThreadNotFound(thread_id.to_string()));
        }

        let title = title
            .filter(|t| !t.trim().is_empty())
            .or_else(|| title_from(&first.content, TITLE_MAX_CHARS))
            .unwrap_or_else(|| UNTITLED.to_string());

        let now = Utc::now();
        let draft = Draft {
            id: uuid::Uuid::new_v4().to_string(),
            thread_id: thread_id.to_string(),
            title,
            current_version: 1,
            created_at: now,
            updated_at: now,
        };
        let version = first.into_version(&draft.id, 1);

        self.drafts.insert_draft(draft.clone(), version.clone()).await?;
        info!(draft_id = %draft.id, thread_id = %thread_id, "Draft created");

        Ok(DraftRevision { draft, version })
    }

    /// Add the next version on top of `current_version`
    ///
    /// Writers racing on the same base land on the same row; the later one
    /// overwrites it and `current_version` never moves backwards.
    pub async fn append_version(&self, draft_id: &str, next: NewVersion) -> Result<DraftRevision> {
        let base = self.get(draft_id).await?;
        let version_number = base.current_version + 1;
        let version = next.into_version(draft_id, version_number);

        match self.drafts.upsert_version(version.clone()).await? {
            UpsertOutcome::Inserted => {}
            UpsertOutcome::Updated => {
                debug!(
                    draft_id = %draft_id,
                    version = version_number,
                    "Concurrent append resolved onto existing version"
                );
            }
        }

        let draft = self
            .drafts
            .advance_current_version(draft_id, version_number)
            .await?;
        info!(draft_id = %draft_id, version = version_number, "Draft version appended");

        Ok(DraftRevision { draft, version })
    }

    /// Replace the content of one version in place
    pub async fn overwrite_version(
        &self,
        draft_id: &str,
        version: Option<u32>,
        content: &str,
    ) -> Result<DraftVersion> {
        let version = self.resolve_version(draft_id, version).await?;
        self.drafts
            .update_version_content(draft_id, version, content)
            .await?;
        self.get_version(draft_id, version).await
    }

    /// Link a version to the assistant message that produced it
    pub async fn set_parent_message(
        &self,
        draft_id: &str,
        version: Option<u32>,
        message_id: &str,
    ) -> Result<()> {
        let version = self.resolve_version(draft_id, version).await?;
        self.drafts
            .set_version_parent(draft_id, version, message_id)
            .await
    }

    pub async fn get(&self, draft_id: &str) -> Result<Draft> {
        self.drafts
            .get_draft(draft_id)
            .await?
            .ok_or_else(|| PersistError::DraftNotFound(draft_id.to_string()))
    }

    /// Most recently updated draft of the thread, if any
    pub async fn active_for_thread(&self, thread_id: &str) -> Result<Option<Draft>> {
        self.drafts.active_draft(thread_id).await
    }

    pub async fn list_for_thread(&self, thread_id: &str) -> Result<Vec<Draft>> {
        self.drafts.list_drafts(thread_id).await
    }

    pub async fn list_versions(&self, draft_id: &str) -> Result<Vec<DraftVersion>> {
        self.get(draft_id).await?;
        self.drafts.list_versions(draft_id).await
    }

    pub async fn get_version(&self, draft_id: &str, version: u32) -> Result<DraftVersion> {
        self.drafts
            .get_version(draft_id, version)
            .await?
            .ok_or_else(|| PersistError::VersionNotFound {
                draft_id: draft_id.to_string(),
                version,
            })
    }

    pub async fn rename(&self, draft_id: &str, title: &str) -> Result<Draft> {
        let title = title.trim();
        if title.is_empty() {
            return Err(PersistError::Validation("title must not be empty".to_string()));
        }
        self.drafts.rename_draft(draft_id, title).await
    }

    pub async fn delete(&self, draft_id: &str) -> Result<()> {
        self.drafts.delete_draft(draft_id).await?;
        info!(draft_id = %draft_id, "Draft deleted");
        Ok(())
    }

    async fn resolve_version(&self, draft_id: &str, version: Option<u32>) -> Result<u32> {
        match version {
            Some(v) => Ok(v),
            None => Ok(self.get(draft_id).await?.current_version),
        }
    }
}
