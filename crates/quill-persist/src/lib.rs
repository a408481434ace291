pub mod builder;
pub mod dbs;
pub mod error;
pub mod models;
pub mod services;
pub mod trait_client;

pub use builder::{Backend, PersistClientBuilder, Stores};
pub use dbs::memory::MemoryStore;
#[cfg(feature = "mongodb")]
pub use dbs::mongo::MongoPersistenceClient;
pub use error::{PersistError, Result};
pub use models::{
    Draft, DraftRevision, DraftVersion, Feedback, FeedbackKind, Message, MessageRole,
    NewMessage, NewScheduledDraft, NewVersion, OrgScope, Principal, ScheduleFilter,
    ScheduleStatus, ScheduledDraft, ScheduledDraftPatch, Thread, UpsertOutcome,
};
pub use services::{CalendarDay, DraftService, FeedbackService, ScheduleService, ThreadService};
pub use trait_client::{DraftStore, FeedbackStore, PersistenceClient, ScheduleStore, ThreadStore};
