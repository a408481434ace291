use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A conversation between one user and the assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub user_id: String,
    pub organization_id: Option<String>,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Thread {
    pub fn new(user_id: impl Into<String>, organization_id: Option<String>, title: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            organization_id,
            title,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Authenticated caller: a user and the organizations it belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    #[serde(default)]
    pub organization_ids: Vec<String>,
}

impl Principal {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            organization_ids: Vec::new(),
        }
    }

    pub fn with_organizations(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.organization_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn belongs_to(&self, organization_id: &str) -> bool {
        self.organization_ids.iter().any(|id| id == organization_id)
    }

    pub fn can_read(&self, thread: &Thread) -> bool {
        thread.user_id == self.user_id
            || thread
                .organization_id
                .as_deref()
                .map_or(false, |org| self.belongs_to(org))
    }

    pub fn owns(&self, thread: &Thread) -> bool {
        thread.user_id == self.user_id
    }
}

/// Organization filter for listings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "organization_id", rename_all = "snake_case")]
pub enum OrgScope {
    #[default]
    Any,
    Organization(String),
    /// Rows without an organization
    Personal,
}

impl OrgScope {
    pub fn matches(&self, organization_id: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Organization(id) => organization_id == Some(id.as_str()),
            Self::Personal => organization_id.is_none(),
        }
    }
}
