use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Document};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};

use crate::error::{PersistError, Result};
use crate::models::{OrgScope, Principal, Thread};

/// Thread document with its sequence counter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoThread {
    #[serde(flatten)]
    pub thread: Thread,
    pub next_sequence: i64,
}

#[derive(Clone)]
pub struct MongoThreadRepository {
    collection: Collection<MongoThread>,
}

impl MongoThreadRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("threads");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> Result<()> {
        let by_id = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        let by_owner = IndexModel::builder()
            .keys(doc! { "user_id": 1, "updated_at": -1 })
            .build();
        self.collection.create_indexes([by_id, by_owner]).await?;
        Ok(())
    }

    pub async fn create_thread(&self, thread: Thread) -> Result<Thread> {
        let doc = MongoThread {
            thread: thread.clone(),
            next_sequence: 0,
        };
        self.collection.insert_one(&doc).await?;
        Ok(thread)
    }

    pub async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        let found = self.collection.find_one(doc! { "id": thread_id }).await?;
        Ok(found.map(|t| t.thread))
    }

    pub async fn list_threads(
        &self,
        principal: &Principal,
        scope: &OrgScope,
        limit: Option<i64>,
        skip: Option<u64>,
    ) -> Result<Vec<Thread>> {
        let readable = doc! {
            "$or": [
                { "user_id": principal.user_id.as_str() },
                { "organization_id": { "$in": principal.organization_ids.clone() } },
            ]
        };
        let filter = match scope_filter(scope) {
            Some(scope) => doc! { "$and": [readable, scope] },
            None => readable,
        };

        let mut find = self.collection.find(filter).sort(doc! { "updated_at": -1 });
        if let Some(limit) = limit {
            find = find.limit(limit);
        }
        if let Some(skip) = skip {
            find = find.skip(skip);
        }

        let threads: Vec<MongoThread> = find.await?.try_collect().await?;
        Ok(threads.into_iter().map(|t| t.thread).collect())
    }

    pub async fn update_title(&self, thread_id: &str, title: &str) -> Result<()> {
        let update = doc! {
            "$set": { "title": title, "updated_at": bson::to_bson(&Utc::now())? }
        };
        let result = self
            .collection
            .update_one(doc! { "id": thread_id }, update)
            .await?;
        if result.matched_count == 0 {
            return Err(PersistError::ThreadNotFound(thread_id.to_string()));
        }
        Ok(())
    }

    /// Atomically take the next message sequence of a thread
    pub async fn allocate_sequence(&self, thread_id: &str) -> Result<u64> {
        let update = doc! {
            "$inc": { "next_sequence": 1_i64 },
            "$set": { "updated_at": bson::to_bson(&Utc::now())? },
        };
        let before = self
            .collection
            .find_one_and_update(doc! { "id": thread_id }, update)
            .return_document(ReturnDocument::Before)
            .await?
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))?;
        Ok(before.next_sequence.max(0) as u64)
    }

    pub async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        let result = self.collection.delete_one(doc! { "id": thread_id }).await?;
        if result.deleted_count == 0 {
            return Err(PersistError::ThreadNotFound(thread_id.to_string()));
        }
        Ok(())
    }
}

/// Extra filter for an organization scope, `None` for any
pub(crate) fn scope_filter(scope: &OrgScope) -> Option<Document> {
    match scope {
        OrgScope::Any => None,
        OrgScope::Organization(id) => Some(doc! { "organization_id": id.as_str() }),
        OrgScope::Personal => Some(doc! { "organization_id": null }),
    }
}
