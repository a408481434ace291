use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};

use crate::error::Result;
use crate::models::Feedback;

#[derive(Clone)]
pub struct MongoFeedbackRepository {
    collection: Collection<Feedback>,
}

impl MongoFeedbackRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("feedback");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> Result<()> {
        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1, "message_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(model).await?;
        Ok(())
    }

    /// Replace-or-insert keyed on (user_id, message_id)
    pub async fn upsert(&self, feedback: &Feedback) -> Result<()> {
        let filter = doc! {
            "user_id": feedback.user_id.as_str(),
            "message_id": feedback.message_id.as_str(),
        };
        self.collection
            .replace_one(filter, feedback)
            .upsert(true)
            .await?;
        Ok(())
    }

    pub async fn get(&self, user_id: &str, message_id: &str) -> Result<Option<Feedback>> {
        Ok(self
            .collection
            .find_one(doc! { "user_id": user_id, "message_id": message_id })
            .await?)
    }

    pub async fn list_for_thread(&self, thread_id: &str) -> Result<Vec<Feedback>> {
        Ok(self
            .collection
            .find(doc! { "thread_id": thread_id })
            .sort(doc! { "updated_at": 1 })
            .await?
            .try_collect()
            .await?)
    }
}
