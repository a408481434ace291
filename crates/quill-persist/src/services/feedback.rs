use chrono::Utc;
use std::sync::Arc;

use crate::error::{PersistError, Result};
use crate::models::{Feedback, FeedbackKind};
use crate::trait_client::{FeedbackStore, ThreadStore};

#[derive(Clone)]
pub struct FeedbackService {
    threads: Arc<dyn ThreadStore>,
    store: Arc<dyn FeedbackStore>,
}

impl FeedbackService {
    pub fn new(threads: Arc<dyn ThreadStore>, store: Arc<dyn FeedbackStore>) -> Self {
        Self { threads, store }
    }

    /// Record or replace a user's rating of a message
    pub async fn submit(
        &self,
        user_id: &str,
        message_id: &str,
        kind: FeedbackKind,
        text: Option<String>,
    ) -> Result<Feedback> {
        let message = self
            .threads
            .get_message(message_id)
            .await?
            .ok_or_else(|| PersistError::MessageNotFound(message_id.to_string()))?;

        self.store
            .upsert_feedback(Feedback {
                user_id: user_id.to_string(),
                message_id: message_id.to_string(),
                thread_id: message.thread_id,
                kind,
                text: text.filter(|t| !t.trim().is_empty()),
                updated_at: Utc::now(),
            })
            .await
    }

    pub async fn get(&self, user_id: &str, message_id: &str) -> Result<Option<Feedback>> {
        self.store.get_feedback(user_id, message_id).await
    }

    pub async fn list_for_thread(&self, thread_id: &str) -> Result<Vec<Feedback>> {
        self.store.list_feedback(thread_id).await
    }
}
