use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::error::{PersistError, Result};
use crate::models::{
    NewScheduledDraft, OrgScope, ScheduleFilter, ScheduleStatus, ScheduledDraft,
    ScheduledDraftPatch,
};
use crate::trait_client::{DraftStore, ScheduleStore};

/// Scheduled rows falling on one local calendar date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub items: Vec<ScheduledDraft>,
}

#[derive(Clone)]
pub struct ScheduleService {
    store: Arc<dyn ScheduleStore>,
    drafts: Arc<dyn DraftStore>,
}

impl ScheduleService {
    pub fn new(store: Arc<dyn ScheduleStore>, drafts: Arc<dyn DraftStore>) -> Self {
        Self { store, drafts }
    }

    pub async fn create(&self, user_id: &str, input: NewScheduledDraft) -> Result<ScheduledDraft> {
        if input.content.trim().is_empty() {
            return Err(PersistError::Validation("content must not be empty".to_string()));
        }

        let row = input.into_scheduled(user_id, Utc::now());
        self.store.insert_scheduled(row.clone()).await?;
        info!(id = %row.id, status = ?row.status, "Scheduled draft created");
        Ok(row)
    }

    /// Copy a draft version (current by default) into a new scheduled row
    pub async fn create_from_draft(
        &self,
        user_id: &str,
        draft_id: &str,
        version: Option<u32>,
        organization_id: Option<String>,
        scheduled_at: Option<DateTime<Utc>>,
    ) -> Result<ScheduledDraft> {
        let draft = self
            .drafts
            .get_draft(draft_id)
            .await?
            .ok_or_else(|| PersistError::DraftNotFound(draft_id.to_string()))?;
        let number = version.unwrap_or(draft.current_version);
        let source = self
            .drafts
            .get_version(draft_id, number)
            .await?
            .ok_or_else(|| PersistError::VersionNotFound {
                draft_id: draft_id.to_string(),
                version: number,
            })?;

        self.create(
            user_id,
            NewScheduledDraft {
                organization_id,
                draft_id: Some(draft.id),
                version: Some(number),
                thread_id: Some(draft.thread_id),
                content: source.content,
                title: Some(draft.title),
                notes: None,
                scheduled_at,
            },
        )
        .await
    }

    pub async fn get(&self, user_id: &str, id: &str) -> Result<ScheduledDraft> {
        self.store
            .get_scheduled(id)
            .await?
            .filter(|row| row.user_id == user_id)
            .ok_or_else(|| PersistError::ScheduledDraftNotFound(id.to_string()))
    }

    pub async fn update(&self, user_id: &str, id: &str, patch: ScheduledDraftPatch) -> Result<ScheduledDraft> {
        let current = self.get(user_id, id).await?;
        let next = current.apply(patch, Utc::now())?;
        self.store.replace_scheduled(next.clone()).await?;

        if next.status != current.status {
            info!(id = %id, from = ?current.status, to = ?next.status, "Scheduled draft transitioned");
        }
        Ok(next)
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> Result<()> {
        self.get(user_id, id).await?;
        self.store.delete_scheduled(id).await
    }

    pub async fn list(&self, user_id: &str, filter: &ScheduleFilter) -> Result<Vec<ScheduledDraft>> {
        self.store.list_scheduled(user_id, filter).await
    }

    /// Scheduled rows grouped by local date in `tz`, dates ascending
    pub async fn calendar(&self, user_id: &str, tz: Tz, scope: OrgScope) -> Result<Vec<CalendarDay>> {
        let filter = ScheduleFilter {
            status: Some(ScheduleStatus::Scheduled),
            scope,
        };
        let rows = self.store.list_scheduled(user_id, &filter).await?;
        Ok(group_by_local_date(rows, tz))
    }
}

fn group_by_local_date(rows: Vec<ScheduledDraft>, tz: Tz) -> Vec<CalendarDay> {
    let mut days: BTreeMap<NaiveDate, Vec<ScheduledDraft>> = BTreeMap::new();
    for row in rows {
        if let Some(at) = row.scheduled_at {
            days.entry(at.with_timezone(&tz).date_naive()).or_default().push(row);
        }
    }

    days.into_iter()
        .map(|(date, mut items)| {
            items.sort_by_key(|r| r.scheduled_at);
            CalendarDay { date, items }
        })
        .collect()
}
