use thiserror::Error;

/// Failures surfaced by a language-model provider.
///
/// Authentication and rate-limit failures get their own variants because the
/// chat pipeline reports them to the user as distinct states.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Provider rejected credentials ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("Provider rate limit exceeded: {message}")]
    RateLimited {
        message: String,
        retry_after_secs: Option<u64>,
    },

    #[error("Provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Failed to parse provider payload: {0}")]
    Parse(String),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl LlmError {
    /// Map a non-success HTTP status to the matching error variant
    pub fn from_status(status: u16, body: String, retry_after_secs: Option<u64>) -> Self {
        match status {
            401 | 403 => Self::Auth { status, message: body },
            429 => Self::RateLimited {
                message: body,
                retry_after_secs,
            },
            _ => Self::Provider { status, message: body },
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

pub type LlmResult<T> = std::result::Result<T, LlmError>;
