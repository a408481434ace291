//! # Quill
//!
//! Backend core for a social post writing assistant: threads of chat
//! messages, versioned drafts, a schedule of saved posts, and a turn
//! pipeline that decides while a model response streams whether it is a
//! draft or a conversational reply.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quill::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Arc::new(OpenAIClient::new(std::env::var("OPENAI_API_KEY")?)?);
//!     let stores = Stores::in_memory();
//!
//!     let principal = Principal::new("user-1");
//!     let thread = stores.thread_service().create_thread(&principal, None, None).await?;
//!
//!     let pipeline = TurnPipeline::builder()
//!         .llm_client(client)
//!         .stores(stores)
//!         .build()?;
//!
//!     let mut events = pipeline.spawn_turn(TurnInput {
//!         thread_id: thread.id,
//!         principal,
//!         content: "Write a post announcing our Q3 results".to_string(),
//!         context: ContextData::default(),
//!     });
//!
//!     while let Some(event) = events.recv().await {
//!         match event {
//!             TurnEvent::Delta { content, channel, .. } => print!("[{:?}] {}", channel, content),
//!             TurnEvent::Completed(turn) => println!("\ndraft: {:?}", turn.draft_id),
//!             _ => {}
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`quill-router`**: intent classification, question policy and turn pipeline
//! - **`quill-llm`**: OpenAI-compatible chat client with streaming
//! - **`quill-types`**: shared events, intents and configuration
//! - **`quill-persist`**: threads, drafts, schedule and feedback stores (memory, MongoDB)
//! - **`quill-context`**: system prompts and token-bounded history
//!
//! ## License
//!
//! MIT

pub mod prelude;

pub use quill_router::{
    DefaultQuestionPolicy, IntentClassifier, QuestionPolicy, RouteOutcome,
    RouteState, StreamRouter, TurnError, TurnInput, TurnPipeline, TurnPipelineBuilder,
};

pub use quill_types::{
    Channel, CompletedTurn, ErrorKind, Intent, LLMConfig, RouterConfig, TurnEvent,
};

pub use quill_llm::{
    ChatClient, ChatOptions, ChatRequest, ChatResponse, Content, LlmError, Message,
    OpenAIClient,
};

pub use quill_persist::{
    Backend, CalendarDay, Draft, DraftRevision, DraftService, DraftVersion, Feedback,
    FeedbackKind, FeedbackService, Message as StoredMessage, MessageRole, NewScheduledDraft,
    NewVersion, OrgScope, PersistClientBuilder, PersistError, PersistenceClient, Principal,
    ScheduleFilter, ScheduleService, ScheduleStatus, ScheduledDraft, ScheduledDraftPatch,
    Stores, Thread, ThreadService,
};

#[cfg(feature = "mongodb")]
pub use quill_persist::MongoPersistenceClient;

pub use quill_context::{ContextData, ContextStrategy, ContextWindow, DefaultContextStrategy};
