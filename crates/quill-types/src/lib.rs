pub mod config;
pub mod events;
pub mod intent;

pub use config::{LLMConfig, RouterConfig};
pub use events::{Channel, CompletedTurn, ErrorKind, TurnEvent};
pub use intent::{Intent, ParseIntentError};
