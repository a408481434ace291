use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::OrgScope;
use crate::error::{PersistError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    Saved,
    Scheduled,
    /// Terminal
    Posted,
}

/// Plannable copy of draft content
///
/// Holds weak back-references to the draft, version and thread it came from;
/// deleting those does not touch this row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledDraft {
    pub id: String,
    pub user_id: String,
    pub organization_id: Option<String>,
    pub draft_id: Option<String>,
    pub version: Option<u32>,
    pub thread_id: Option<String>,
    pub content: String,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub status: ScheduleStatus,
    pub posted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewScheduledDraft {
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub draft_id: Option<String>,
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub thread_id: Option<String>,
    pub content: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl NewScheduledDraft {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn scheduled_at(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_at = Some(at);
        self
    }

    pub fn organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    pub(crate) fn into_scheduled(self, user_id: &str, now: DateTime<Utc>) -> ScheduledDraft {
        let status = if self.scheduled_at.is_some() {
            ScheduleStatus::Scheduled
        } else {
            ScheduleStatus::Saved
        };

        ScheduledDraft {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            organization_id: self.organization_id,
            draft_id: self.draft_id,
            version: self.version,
            thread_id: self.thread_id,
            content: self.content,
            title: self.title,
            notes: self.notes,
            scheduled_at: self.scheduled_at,
            status,
            posted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduledDraftPatch {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// `Some(None)` (JSON `null`) clears the schedule
    #[serde(default, deserialize_with = "double_option")]
    pub scheduled_at: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub status: Option<ScheduleStatus>,
}

fn double_option<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ScheduledDraft {
    /// Apply a patch and the status transitions it implies
    pub fn apply(&self, patch: ScheduledDraftPatch, now: DateTime<Utc>) -> Result<ScheduledDraft> {
        let mut next = self.clone();

        if let Some(content) = patch.content {
            next.content = content;
        }
        if let Some(title) = patch.title {
            next.title = Some(title);
        }
        if let Some(notes) = patch.notes {
            next.notes = Some(notes);
        }

        let was_scheduled = self.scheduled_at.is_some();
        if let Some(scheduled_at) = patch.scheduled_at {
            next.scheduled_at = scheduled_at;
        }
        let is_scheduled = next.scheduled_at.is_some();

        let posted = self.status == ScheduleStatus::Posted;
        match patch.status {
            Some(ScheduleStatus::Posted) => {
                if !posted {
                    next.status = ScheduleStatus::Posted;
                    next.posted_at = Some(now);
                }
            }
            Some(status) if posted => {
                return Err(PersistError::Validation(format!(
                    "posted draft {} cannot move to {:?}",
                    self.id, status
                )));
            }
            Some(ScheduleStatus::Scheduled) => {
                if !is_scheduled {
                    return Err(PersistError::Validation(
                        "status 'scheduled' requires scheduled_at".to_string(),
                    ));
                }
                next.status = ScheduleStatus::Scheduled;
            }
            Some(ScheduleStatus::Saved) => next.status = ScheduleStatus::Saved,
            None if !posted => {
                if !was_scheduled && is_scheduled {
                    next.status = ScheduleStatus::Scheduled;
                } else if was_scheduled && !is_scheduled {
                    next.status = ScheduleStatus::Saved;
                }
            }
            None => {}
        }

        next.updated_at = now;
        Ok(next)
    }
}

/// Listing filter for scheduled drafts
#[derive(Debug, Clone, Default)]
pub struct ScheduleFilter {
    pub status: Option<ScheduleStatus>,
    pub scope: OrgScope,
}

impl ScheduleFilter {
    pub fn matches(&self, row: &ScheduledDraft) -> bool {
        self.status.map_or(true, |s| s == row.status)
            && self.scope.matches(row.organization_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, hour, 0, 0).unwrap()
    }

    fn saved() -> ScheduledDraft {
        NewScheduledDraft::new("Launch day").into_scheduled("u1", at(8))
    }

    #[test]
    fn test_creation_status_follows_schedule() {
        assert_eq!(saved().status, ScheduleStatus::Saved);

        let scheduled = NewScheduledDraft::new("x")
            .scheduled_at(at(12))
            .into_scheduled("u1", at(8));
        assert_eq!(scheduled.status, ScheduleStatus::Scheduled);
    }

    #[test]
    fn test_setting_and_clearing_schedule() {
        let row = saved();
        let scheduled = row
            .apply(
                ScheduledDraftPatch {
                    scheduled_at: Some(Some(at(12))),
                    ..Default::default()
                },
                at(9),
            )
            .unwrap();
        assert_eq!(scheduled.status, ScheduleStatus::Scheduled);

        let cleared = scheduled
            .apply(
                ScheduledDraftPatch {
                    scheduled_at: Some(None),
                    ..Default::default()
                },
                at(10),
            )
            .unwrap();
        assert_eq!(cleared.status, ScheduleStatus::Saved);
        assert!(cleared.scheduled_at.is_none());
    }

    #[test]
    fn test_posted_is_terminal() {
        let posted = saved()
            .apply(
                ScheduledDraftPatch {
                    status: Some(ScheduleStatus::Posted),
                    ..Default::default()
                },
                at(11),
            )
            .unwrap();
        assert_eq!(posted.status, ScheduleStatus::Posted);
        assert_eq!(posted.posted_at, Some(at(11)));

        let rescheduled = posted
            .apply(
                ScheduledDraftPatch {
                    scheduled_at: Some(Some(at(15))),
                    ..Default::default()
                },
                at(12),
            )
            .unwrap();
        assert_eq!(rescheduled.status, ScheduleStatus::Posted);

        let reposted = posted
            .apply(
                ScheduledDraftPatch {
                    status: Some(ScheduleStatus::Posted),
                    ..Default::default()
                },
                at(13),
            )
            .unwrap();
        assert_eq!(reposted.posted_at, Some(at(11)));

        let err = posted.apply(
            ScheduledDraftPatch {
                status: Some(ScheduleStatus::Saved),
                ..Default::default()
            },
            at(14),
        );
        assert!(matches!(err, Err(PersistError::Validation(_))));
    }

    #[test]
    fn test_explicit_scheduled_requires_time() {
        let err = saved().apply(
            ScheduledDraftPatch {
                status: Some(ScheduleStatus::Scheduled),
                ..Default::default()
            },
            at(9),
        );
        assert!(matches!(err, Err(PersistError::Validation(_))));
    }

    #[test]
    fn test_patch_null_clears_schedule() {
        let patch: ScheduledDraftPatch =
            serde_json::from_str(r#"{"scheduled_at": null}"#).unwrap();
        assert_eq!(patch.scheduled_at, Some(None));

        let patch: ScheduledDraftPatch = serde_json::from_str(r#"{"notes": "hi"}"#).unwrap();
        assert_eq!(patch.scheduled_at, None);
    }
}
