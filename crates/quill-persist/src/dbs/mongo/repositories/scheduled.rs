use futures::TryStreamExt;
use mongodb::bson::{self, doc};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};

use super::thread::scope_filter;
use crate::error::{PersistError, Result};
use crate::models::{ScheduleFilter, ScheduledDraft};

#[derive(Clone)]
pub struct MongoScheduledRepository {
    collection: Collection<ScheduledDraft>,
}

impl MongoScheduledRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("scheduled_drafts");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> Result<()> {
        let by_id = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        let by_owner = IndexModel::builder()
            .keys(doc! { "user_id": 1, "status": 1 })
            .build();
        self.collection.create_indexes([by_id, by_owner]).await?;
        Ok(())
    }

    pub async fn insert(&self, row: &ScheduledDraft) -> Result<()> {
        self.collection.insert_one(row).await?;
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<ScheduledDraft>> {
        Ok(self.collection.find_one(doc! { "id": id }).await?)
    }

    pub async fn replace(&self, row: &ScheduledDraft) -> Result<()> {
        let result = self
            .collection
            .replace_one(doc! { "id": row.id.as_str() }, row)
            .await?;
        if result.matched_count == 0 {
            return Err(PersistError::ScheduledDraftNotFound(row.id.clone()));
        }
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        if result.deleted_count == 0 {
            return Err(PersistError::ScheduledDraftNotFound(id.to_string()));
        }
        Ok(())
    }

    pub async fn list(&self, user_id: &str, filter: &ScheduleFilter) -> Result<Vec<ScheduledDraft>> {
        let mut query = doc! { "user_id": user_id };
        if let Some(status) = filter.status {
            query.insert("status", bson::to_bson(&status)?);
        }
        if let Some(scope) = scope_filter(&filter.scope) {
            query.extend(scope);
        }

        Ok(self
            .collection
            .find(query)
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect()
            .await?)
    }
}
