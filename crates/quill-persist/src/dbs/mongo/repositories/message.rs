use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};

use crate::error::Result;
use crate::models::Message;

#[derive(Clone)]
pub struct MongoMessageRepository {
    collection: Collection<Message>,
}

impl MongoMessageRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("messages");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> Result<()> {
        let by_id = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        let by_sequence = IndexModel::builder()
            .keys(doc! { "thread_id": 1, "sequence": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_indexes([by_id, by_sequence]).await?;
        Ok(())
    }

    pub async fn save_message(&self, message: &Message) -> Result<()> {
        self.collection.insert_one(message).await?;
        Ok(())
    }

    pub async fn get_message(&self, message_id: &str) -> Result<Option<Message>> {
        Ok(self.collection.find_one(doc! { "id": message_id }).await?)
    }

    /// Newest `limit` messages older than `before_sequence`, returned oldest first
    pub async fn get_messages(
        &self,
        thread_id: &str,
        limit: Option<usize>,
        before_sequence: Option<u64>,
    ) -> Result<Vec<Message>> {
        let mut filter = doc! { "thread_id": thread_id };
        if let Some(before) = before_sequence {
            filter.insert("sequence", doc! { "$lt": before as i64 });
        }

        let mut find = self.collection.find(filter).sort(doc! { "sequence": -1 });
        if let Some(limit) = limit {
            find = find.limit(limit as i64);
        }

        let mut messages: Vec<Message> = find.await?.try_collect().await?;
        messages.reverse();
        Ok(messages)
    }

    pub async fn delete_for_thread(&self, thread_id: &str) -> Result<()> {
        self.collection
            .delete_many(doc! { "thread_id": thread_id })
            .await?;
        Ok(())
    }
}
