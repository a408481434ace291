use std::sync::Arc;

use crate::dbs::memory::MemoryStore;
use crate::error::{PersistError, Result};
use crate::services::{DraftService, FeedbackService, ScheduleService, ThreadService};
use crate::trait_client::{DraftStore, FeedbackStore, PersistenceClient, ScheduleStore, ThreadStore};

/// Storage backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Memory,
    Mongodb,
}

/// One backend viewed through each store trait
#[derive(Clone)]
pub struct Stores {
    pub threads: Arc<dyn ThreadStore>,
    pub drafts: Arc<dyn DraftStore>,
    pub schedules: Arc<dyn ScheduleStore>,
    pub feedback: Arc<dyn FeedbackStore>,
}

impl Stores {
    pub fn from_client<C: PersistenceClient + 'static>(client: Arc<C>) -> Self {
        Self {
            threads: client.clone(),
            drafts: client.clone(),
            schedules: client.clone(),
            feedback: client,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_client(Arc::new(MemoryStore::new()))
    }

    pub fn thread_service(&self) -> ThreadService {
        ThreadService::new(self.threads.clone())
    }

    pub fn draft_service(&self) -> DraftService {
        DraftService::new(self.threads.clone(), self.drafts.clone())
    }

    pub fn schedule_service(&self) -> ScheduleService {
        ScheduleService::new(self.schedules.clone(), self.drafts.clone())
    }

    pub fn feedback_service(&self) -> FeedbackService {
        FeedbackService::new(self.threads.clone(), self.feedback.clone())
    }
}

pub struct PersistClientBuilder {
    backend: Backend,
    mongodb_uri: Option<String>,
    database: Option<String>,
}

impl PersistClientBuilder {
    pub fn new() -> Self {
        Self {
            backend: Backend::Memory,
            mongodb_uri: None,
            database: None,
        }
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn mongodb_uri(mut self, uri: impl Into<String>) -> Self {
        self.mongodb_uri = Some(uri.into());
        self
    }

    pub fn database(mut self, db: impl Into<String>) -> Self {
        self.database = Some(db.into());
        self
    }

    pub async fn build(self) -> Result<Stores> {
        match self.backend {
            Backend::Memory => Ok(Stores::in_memory()),
            Backend::Mongodb => self.build_mongo().await,
        }
    }

    #[cfg(feature = "mongodb")]
    async fn build_mongo(self) -> Result<Stores> {
        let uri = self
            .mongodb_uri
            .ok_or_else(|| PersistError::Internal("mongodb_uri is required".to_string()))?;
        let database = self
            .database
            .ok_or_else(|| PersistError::Internal("database is required".to_string()))?;

        let client = crate::dbs::mongo::MongoPersistenceClient::connect(&uri, &database).await?;
        Ok(Stores::from_client(Arc::new(client)))
    }

    #[cfg(not(feature = "mongodb"))]
    async fn build_mongo(self) -> Result<Stores> {
        let _ = (self.mongodb_uri, self.database);
        Err(PersistError::Internal(
            "mongodb backend requires the `mongodb` feature".to_string(),
        ))
    }
}

impl Default for PersistClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
