use std::sync::Arc;
use tracing::info;

use crate::error::{PersistError, Result};
use crate::models::{title_from, Message, NewMessage, OrgScope, Principal, Thread, MessageRole};
use crate::trait_client::ThreadStore;

const AUTO_TITLE_MAX_CHARS: usize = 60;

#[derive(Clone)]
pub struct ThreadService {
    store: Arc<dyn ThreadStore>,
}

impl ThreadService {
    pub fn new(store: Arc<dyn ThreadStore>) -> Self {
        Self { store }
    }

    pub async fn create_thread(
        &self,
        owner: &Principal,
        organization_id: Option<String>,
        title: Option<String>,
    ) -> Result<Thread> {
        if let Some(org) = organization_id.as_deref() {
            if !owner.belongs_to(org) {
                return Err(PersistError::Validation(format!(
                    "user is not a member of organization {}",
                    org
                )));
            }
        }

        let title = title.filter(|t| !t.trim().is_empty());
        let thread = self
            .store
            .create_thread(Thread::new(&owner.user_id, organization_id, title))
            .await?;
        info!(thread_id = %thread.id, user_id = %owner.user_id, "Thread created");
        Ok(thread)
    }

    pub async fn list_threads(
        &self,
        principal: &Principal,
        scope: &OrgScope,
        limit: Option<i64>,
        skip: Option<u64>,
    ) -> Result<Vec<Thread>> {
        self.store.list_threads(principal, scope, limit, skip).await
    }

    /// Fetch a thread the principal may read; otherwise `ThreadNotFound`
    pub async fn get_thread(&self, thread_id: &str, principal: &Principal) -> Result<Thread> {
        self.store
            .get_thread(thread_id)
            .await?
            .filter(|t| principal.can_read(t))
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))
    }

    pub async fn update_title(&self, thread_id: &str, principal: &Principal, title: &str) -> Result<Thread> {
        let title = title.trim();
        if title.is_empty() {
            return Err(PersistError::Validation("title must not be empty".to_string()));
        }

        self.owned_thread(thread_id, principal).await?;
        self.store.update_thread_title(thread_id, title).await?;
        self.get_thread(thread_id, principal).await
    }

    pub async fn delete_thread(&self, thread_id: &str, principal: &Principal) -> Result<()> {
        self.owned_thread(thread_id, principal).await?;
        self.store.delete_thread(thread_id).await?;
        info!(thread_id = %thread_id, "Thread deleted");
        Ok(())
    }

    /// Append to the log; an untitled thread takes its title from the first user message
    pub async fn append_message(&self, message: NewMessage) -> Result<Message> {
        let thread = self
            .store
            .get_thread(&message.thread_id)
            .await?
            .ok_or_else(|| PersistError::ThreadNotFound(message.thread_id.clone()))?;

        let message = self.store.append_message(message).await?;

        if thread.title.is_none() && message.role == MessageRole::User {
            if let Some(title) = title_from(&message.content, AUTO_TITLE_MAX_CHARS) {
                self.store.update_thread_title(&thread.id, &title).await?;
            }
        }
        Ok(message)
    }

    pub async fn get_message(&self, message_id: &str) -> Result<Message> {
        self.store
            .get_message(message_id)
            .await?
            .ok_or_else(|| PersistError::MessageNotFound(message_id.to_string()))
    }

    pub async fn list_messages(
        &self,
        thread_id: &str,
        limit: Option<usize>,
        before_sequence: Option<u64>,
    ) -> Result<Vec<Message>> {
        self.store
            .list_messages(thread_id, limit, before_sequence)
            .await
    }

    /// Fetch a thread the principal owns; readers get `ThreadNotFound` too
    pub async fn owned_thread(&self, thread_id: &str, principal: &Principal) -> Result<Thread> {
        self.store
            .get_thread(thread_id)
            .await?
            .filter(|t| principal.owns(t))
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))
    }
}
