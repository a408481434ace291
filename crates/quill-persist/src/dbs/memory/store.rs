use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;

use crate::error::{PersistError, Result};
use crate::models::{
    Draft, DraftVersion, Feedback, Message, NewMessage, OrgScope, Principal, ScheduleFilter,
    ScheduledDraft, Thread, UpsertOutcome,
};
use crate::trait_client::{DraftStore, FeedbackStore, ScheduleStore, ThreadStore};

struct ThreadEntry {
    thread: Thread,
    next_sequence: u64,
}

#[derive(Default)]
struct State {
    threads: HashMap<String, ThreadEntry>,
    messages: HashMap<String, Message>,
    drafts: HashMap<String, Draft>,
    versions: HashMap<String, BTreeMap<u32, DraftVersion>>,
    scheduled: HashMap<String, ScheduledDraft>,
    feedback: HashMap<(String, String), Feedback>,
}

/// Process-local store used by default and in tests
///
/// Every operation runs under one lock, so read-modify-write steps inside a
/// single call are atomic.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ThreadStore for MemoryStore {
    async fn create_thread(&self, thread: Thread) -> Result<Thread> {
        let mut state = self.state.lock().await;
        state.threads.insert(
            thread.id.clone(),
            ThreadEntry {
                thread: thread.clone(),
                next_sequence: 0,
            },
        );
        Ok(thread)
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        let state = self.state.lock().await;
        Ok(state.threads.get(thread_id).map(|e| e.thread.clone()))
    }

    async fn list_threads(
        &self,
        principal: &Principal,
        scope: &OrgScope,
        limit: Option<i64>,
        skip: Option<u64>,
    ) -> Result<Vec<Thread>> {
        let state = self.state.lock().await;
        let mut threads: Vec<Thread> = state
            .threads
            .values()
            .map(|e| &e.thread)
            .filter(|t| principal.can_read(t) && scope.matches(t.organization_id.as_deref()))
            .cloned()
            .collect();
        threads.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        let skip = skip.unwrap_or(0) as usize;
        let limit = limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
        Ok(threads.into_iter().skip(skip).take(limit).collect())
    }

    async fn update_thread_title(&self, thread_id: &str, title: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        let entry = state
            .threads
            .get_mut(thread_id)
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))?;
        entry.thread.title = Some(title.to_string());
        entry.thread.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.threads.remove(thread_id).is_none() {
            return Err(PersistError::ThreadNotFound(thread_id.to_string()));
        }

        state.messages.retain(|_, m| m.thread_id != thread_id);
        let draft_ids: Vec<String> = state
            .drafts
            .values()
            .filter(|d| d.thread_id == thread_id)
            .map(|d| d.id.clone())
            .collect();
        for id in draft_ids {
            state.drafts.remove(&id);
            state.versions.remove(&id);
        }
        Ok(())
    }

    async fn append_message(&self, message: NewMessage) -> Result<Message> {
        let mut state = self.state.lock().await;
        let entry = state
            .threads
            .get_mut(&message.thread_id)
            .ok_or_else(|| PersistError::ThreadNotFound(message.thread_id.clone()))?;

        let sequence = entry.next_sequence;
        entry.next_sequence += 1;
        entry.thread.updated_at = Utc::now();

        let message = message.into_message(sequence);
        state.messages.insert(message.id.clone(), message.clone());
        Ok(message)
    }

    async fn get_message(&self, message_id: &str) -> Result<Option<Message>> {
        let state = self.state.lock().await;
        Ok(state.messages.get(message_id).cloned())
    }

    async fn list_messages(
        &self,
        thread_id: &str,
        limit: Option<usize>,
        before_sequence: Option<u64>,
    ) -> Result<Vec<Message>> {
        let state = self.state.lock().await;
        let mut messages: Vec<Message> = state
            .messages
            .values()
            .filter(|m| m.thread_id == thread_id)
            .filter(|m| before_sequence.map_or(true, |b| m.sequence < b))
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.sequence);

        if let Some(limit) = limit {
            let start = messages.len().saturating_sub(limit);
            messages.drain(..start);
        }
        Ok(messages)
    }
}

#[async_trait]
impl DraftStore for MemoryStore {
    async fn insert_draft(&self, draft: Draft, first: DraftVersion) -> Result<()> {
        let mut state = self.state.lock().await;
        let mut versions = BTreeMap::new();
        versions.insert(first.version, first);
        state.versions.insert(draft.id.clone(), versions);
        state.drafts.insert(draft.id.clone(), draft);
        Ok(())
    }

    async fn get_draft(&self, draft_id: &str) -> Result<Option<Draft>> {
        let state = self.state.lock().await;
        Ok(state.drafts.get(draft_id).cloned())
    }

    async fn active_draft(&self, thread_id: &str) -> Result<Option<Draft>> {
        let state = self.state.lock().await;
        Ok(state
            .drafts
            .values()
            .filter(|d| d.thread_id == thread_id)
            .max_by_key(|d| d.updated_at)
            .cloned())
    }

    async fn list_drafts(&self, thread_id: &str) -> Result<Vec<Draft>> {
        let state = self.state.lock().await;
        let mut drafts: Vec<Draft> = state
            .drafts
            .values()
            .filter(|d| d.thread_id == thread_id)
            .cloned()
            .collect();
        drafts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(drafts)
    }

    async fn upsert_version(&self, version: DraftVersion) -> Result<UpsertOutcome> {
        let mut state = self.state.lock().await;
        let versions = state
            .versions
            .get_mut(&version.draft_id)
            .ok_or_else(|| PersistError::DraftNotFound(version.draft_id.clone()))?;

        match versions.get_mut(&version.version) {
            Some(existing) => {
                existing.content = version.content;
                existing.edit_prompt = version.edit_prompt;
                existing.changes = version.changes;
                existing.parent_message_id = version.parent_message_id;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                versions.insert(version.version, version);
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    async fn advance_current_version(&self, draft_id: &str, version: u32) -> Result<Draft> {
        let mut state = self.state.lock().await;
        let draft = state
            .drafts
            .get_mut(draft_id)
            .ok_or_else(|| PersistError::DraftNotFound(draft_id.to_string()))?;
        draft.current_version = draft.current_version.max(version);
        draft.updated_at = Utc::now();
        Ok(draft.clone())
    }

    async fn get_version(&self, draft_id: &str, version: u32) -> Result<Option<DraftVersion>> {
        let state = self.state.lock().await;
        Ok(state
            .versions
            .get(draft_id)
            .and_then(|v| v.get(&version))
            .cloned())
    }

    async fn list_versions(&self, draft_id: &str) -> Result<Vec<DraftVersion>> {
        let state = self.state.lock().await;
        Ok(state
            .versions
            .get(draft_id)
            .map(|v| v.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn update_version_content(&self, draft_id: &str, version: u32, content: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        let row = state
            .versions
            .get_mut(draft_id)
            .and_then(|v| v.get_mut(&version))
            .ok_or_else(|| PersistError::VersionNotFound {
                draft_id: draft_id.to_string(),
                version,
            })?;
        row.content = content.to_string();
        Ok(())
    }

    async fn set_version_parent(&self, draft_id: &str, version: u32, message_id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        let row = state
            .versions
            .get_mut(draft_id)
            .and_then(|v| v.get_mut(&version))
            .ok_or_else(|| PersistError::VersionNotFound {
                draft_id: draft_id.to_string(),
                version,
            })?;
        row.parent_message_id = Some(message_id.to_string());
        Ok(())
    }

    async fn rename_draft(&self, draft_id: &str, title: &str) -> Result<Draft> {
        let mut state = self.state.lock().await;
        let draft = state
            .drafts
            .get_mut(draft_id)
            .ok_or_else(|| PersistError::DraftNotFound(draft_id.to_string()))?;
        draft.title = title.to_string();
        draft.updated_at = Utc::now();
        Ok(draft.clone())
    }

    async fn delete_draft(&self, draft_id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state
            .drafts
            .remove(draft_id)
            .ok_or_else(|| PersistError::DraftNotFound(draft_id.to_string()))?;
        state.versions.remove(draft_id);
        Ok(())
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn insert_scheduled(&self, row: ScheduledDraft) -> Result<()> {
        let mut state = self.state.lock().await;
        state.scheduled.insert(row.id.clone(), row);
        Ok(())
    }

    async fn get_scheduled(&self, id: &str) -> Result<Option<ScheduledDraft>> {
        let state = self.state.lock().await;
        Ok(state.scheduled.get(id).cloned())
    }

    async fn replace_scheduled(&self, row: ScheduledDraft) -> Result<()> {
        let mut state = self.state.lock().await;
        match state.scheduled.get_mut(&row.id) {
            Some(existing) => {
                *existing = row;
                Ok(())
            }
            None => Err(PersistError::ScheduledDraftNotFound(row.id)),
        }
    }

    async fn delete_scheduled(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state
            .scheduled
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| PersistError::ScheduledDraftNotFound(id.to_string()))
    }

    async fn list_scheduled(&self, user_id: &str, filter: &ScheduleFilter) -> Result<Vec<ScheduledDraft>> {
        let state = self.state.lock().await;
        let mut rows: Vec<ScheduledDraft> = state
            .scheduled
            .values()
            .filter(|r| r.user_id == user_id && filter.matches(r))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

#[async_trait]
impl FeedbackStore for MemoryStore {
    async fn upsert_feedback(&self, feedback: Feedback) -> Result<Feedback> {
        let mut state = self.state.lock().await;
        let key = (feedback.user_id.clone(), feedback.message_id.clone());
        state.feedback.insert(key, feedback.clone());
        Ok(feedback)
    }

    async fn get_feedback(&self, user_id: &str, message_id: &str) -> Result<Option<Feedback>> {
        let state = self.state.lock().await;
        Ok(state
            .feedback
            .get(&(user_id.to_string(), message_id.to_string()))
            .cloned())
    }

    async fn list_feedback(&self, thread_id: &str) -> Result<Vec<Feedback>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Feedback> = state
            .feedback
            .values()
            .filter(|f| f.thread_id == thread_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.updated_at.cmp(&b.updated_at));
        Ok(rows)
    }
}
