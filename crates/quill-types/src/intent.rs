use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// What the user wants from the assistant in one turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Edit,
    Ideate,
    Draft,
    Feedback,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown intent label: {0}")]
pub struct ParseIntentError(pub String);

impl Intent {
    pub const ALL: [Intent; 4] = [Intent::Edit, Intent::Ideate, Intent::Draft, Intent::Feedback];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Ideate => "ideate",
            Self::Draft => "draft",
            Self::Feedback => "feedback",
        }
    }

    /// Intents whose output starts out in the draft preview
    pub fn produces_content(&self) -> bool {
        matches!(self, Self::Draft | Self::Edit)
    }
}

impl Default for Intent {
    fn default() -> Self {
        Intent::Draft
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = ParseIntentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "edit" => Ok(Self::Edit),
            "ideate" => Ok(Self::Ideate),
            "draft" => Ok(Self::Draft),
            "feedback" => Ok(Self::Feedback),
            other => Err(ParseIntentError(other.to_string())),
        }
    }
}
