use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[cfg(feature = "mongodb")]
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[cfg(feature = "mongodb")]
    #[error("BSON serialization error: {0}")]
    BsonSerialization(#[from] bson::ser::Error),

    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Message not found: {0}")]
    MessageNotFound(String),

    #[error("Draft not found: {0}")]
    DraftNotFound(String),

    #[error("Draft version not found: {draft_id} v{version}")]
    VersionNotFound { draft_id: String, version: u32 },

    #[error("Scheduled draft not found: {0}")]
    ScheduledDraftNotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PersistError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ThreadNotFound(_)
                | Self::MessageNotFound(_)
                | Self::DraftNotFound(_)
                | Self::VersionNotFound { .. }
                | Self::ScheduledDraftNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PersistError>;
