use quill_context::ContextError;
use quill_llm::LlmError;
use quill_persist::PersistError;
use quill_types::ErrorKind;
use thiserror::Error;

/// Reasons a chat turn stops before completing
#[derive(Error, Debug)]
pub enum TurnError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("Invalid pipeline configuration: {0}")]
    Config(String),

    /// Event receiver dropped or stream cancelled
    #[error("Turn cancelled")]
    Cancelled,
}

impl TurnError {
    /// User-visible error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Llm(LlmError::Auth { .. }) => ErrorKind::Auth,
            Self::Llm(LlmError::RateLimited { .. }) => ErrorKind::RateLimited,
            Self::Llm(_) => ErrorKind::Provider,
            Self::Persist(e) if e.is_not_found() => ErrorKind::NotFound,
            Self::Context(ContextError::Persist(e)) if e.is_not_found() => ErrorKind::NotFound,
            Self::Persist(_) | Self::Context(_) | Self::Config(_) | Self::Cancelled => ErrorKind::Internal,
        }
    }
}
