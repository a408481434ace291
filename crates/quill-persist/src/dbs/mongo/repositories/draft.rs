use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Document};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};
use tracing::debug;

use crate::dbs::mongo::is_duplicate_key;
use crate::error::{PersistError, Result};
use crate::models::{Draft, DraftVersion, UpsertOutcome};

#[derive(Clone)]
pub struct MongoDraftRepository {
    drafts: Collection<Draft>,
    versions: Collection<DraftVersion>,
}

impl MongoDraftRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let db = client.database(db_name);
        Self {
            drafts: db.collection("drafts"),
            versions: db.collection("draft_versions"),
        }
    }

    pub async fn ensure_indexes(&self) -> Result<()> {
        let unique = || IndexOptions::builder().unique(true).build();
        self.drafts
            .create_indexes([
                IndexModel::builder().keys(doc! { "id": 1 }).options(unique()).build(),
                IndexModel::builder()
                    .keys(doc! { "thread_id": 1, "updated_at": -1 })
                    .build(),
            ])
            .await?;
        self.versions
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "draft_id": 1, "version": 1 })
                    .options(unique())
                    .build(),
            )
            .await?;
        Ok(())
    }

    pub async fn insert_draft(&self, draft: &Draft, first: &DraftVersion) -> Result<()> {
        self.drafts.insert_one(draft).await?;
        self.versions.insert_one(first).await?;
        Ok(())
    }

    pub async fn get_draft(&self, draft_id: &str) -> Result<Option<Draft>> {
        Ok(self.drafts.find_one(doc! { "id": draft_id }).await?)
    }

    pub async fn active_draft(&self, thread_id: &str) -> Result<Option<Draft>> {
        Ok(self
            .drafts
            .find_one(doc! { "thread_id": thread_id })
            .sort(doc! { "updated_at": -1 })
            .await?)
    }

    pub async fn list_drafts(&self, thread_id: &str) -> Result<Vec<Draft>> {
        Ok(self
            .drafts
            .find(doc! { "thread_id": thread_id })
            .sort(doc! { "updated_at": -1 })
            .await?
            .try_collect()
            .await?)
    }

    /// Conditional insert-or-update on (draft_id, version)
    ///
    /// Two upserts racing on a missing row can both attempt the insert; the
    /// loser sees E11000 and is replayed as a plain update.
    pub async fn upsert_version(&self, version: &DraftVersion) -> Result<UpsertOutcome> {
        let filter = doc! { "draft_id": version.draft_id.as_str(), "version": version.version as i64 };
        let update = doc! {
            "$set": {
                "content": version.content.as_str(),
                "edit_prompt": bson::to_bson(&version.edit_prompt)?,
                "changes": bson::to_bson(&version.changes)?,
                "parent_message_id": bson::to_bson(&version.parent_message_id)?,
            },
            "$setOnInsert": { "created_at": bson::to_bson(&version.created_at)? },
        };

        match self
            .versions
            .update_one(filter.clone(), update.clone())
            .upsert(true)
            .await
        {
            Ok(result) if result.upserted_id.is_some() => Ok(UpsertOutcome::Inserted),
            Ok(_) => Ok(UpsertOutcome::Updated),
            Err(err) if is_duplicate_key(&err) => {
                debug!(draft_id = %version.draft_id, version = version.version, "Upsert lost insert race, updating");
                self.versions.update_one(filter, update).await?;
                Ok(UpsertOutcome::Updated)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn advance_current_version(&self, draft_id: &str, version: u32) -> Result<Draft> {
        let update = doc! {
            "$max": { "current_version": version as i64 },
            "$set": { "updated_at": bson::to_bson(&Utc::now())? },
        };
        self.drafts
            .find_one_and_update(doc! { "id": draft_id }, update)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| PersistError::DraftNotFound(draft_id.to_string()))
    }

    pub async fn get_version(&self, draft_id: &str, version: u32) -> Result<Option<DraftVersion>> {
        Ok(self
            .versions
            .find_one(doc! { "draft_id": draft_id, "version": version as i64 })
            .await?)
    }

    pub async fn list_versions(&self, draft_id: &str) -> Result<Vec<DraftVersion>> {
        Ok(self
            .versions
            .find(doc! { "draft_id": draft_id })
            .sort(doc! { "version": 1 })
            .await?
            .try_collect()
            .await?)
    }

    pub async fn set_version_field(
        &self,
        draft_id: &str,
        version: u32,
        field: &str,
        value: &str,
    ) -> Result<()> {
        let mut set = Document::new();
        set.insert(field, value);
        let result = self
            .versions
            .update_one(
                doc! { "draft_id": draft_id, "version": version as i64 },
                doc! { "$set": set },
            )
            .await?;
        if result.matched_count == 0 {
            return Err(PersistError::VersionNotFound {
                draft_id: draft_id.to_string(),
                version,
            });
        }
        Ok(())
    }

    pub async fn rename_draft(&self, draft_id: &str, title: &str) -> Result<Draft> {
        let update = doc! {
            "$set": { "title": title, "updated_at": bson::to_bson(&Utc::now())? }
        };
        self.drafts
            .find_one_and_update(doc! { "id": draft_id }, update)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| PersistError::DraftNotFound(draft_id.to_string()))
    }

    pub async fn delete_draft(&self, draft_id: &str) -> Result<()> {
        let result = self.drafts.delete_one(doc! { "id": draft_id }).await?;
        if result.deleted_count == 0 {
            return Err(PersistError::DraftNotFound(draft_id.to_string()));
        }
        self.versions
            .delete_many(doc! { "draft_id": draft_id })
            .await?;
        Ok(())
    }

    pub async fn delete_for_thread(&self, thread_id: &str) -> Result<()> {
        let ids: Vec<String> = self
            .list_drafts(thread_id)
            .await?
            .into_iter()
            .map(|d| d.id)
            .collect();
        if ids.is_empty() {
            return Ok(());
        }

        self.versions
            .delete_many(doc! { "draft_id": { "$in": ids } })
            .await?;
        self.drafts
            .delete_many(doc! { "thread_id": thread_id })
            .await?;
        Ok(())
    }
}
