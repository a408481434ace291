//! Prelude module for convenient imports
//!
//! ```rust
//! use quill::prelude::*;
//! ```

pub use crate::{
    TurnPipeline, TurnPipelineBuilder, TurnInput, TurnEvent, CompletedTurn, Channel, Intent,
    LLMConfig, RouterConfig,
    ChatClient, OpenAIClient, Message,
    Stores, Principal, Thread, Draft, DraftVersion, ScheduledDraft, ScheduleStatus,
    ContextData, ContextStrategy, DefaultContextStrategy,
};
