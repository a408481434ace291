pub mod builder;
pub mod classifier;
pub mod error;
pub mod policy;
pub mod router;
pub mod streamer;
pub mod turn;

pub use builder::TurnPipelineBuilder;
pub use classifier::IntentClassifier;
pub use error::TurnError;
pub use policy::{DefaultQuestionPolicy, QuestionPolicy};
pub use router::{RouteOutcome, RouteState, StreamRouter};
pub use streamer::{ResponseStream, ResponseStreamer};
pub use turn::{TurnInput, TurnPipeline};

// Re-export key types from quill-types
pub use quill_types::{Channel, CompletedTurn, ErrorKind, Intent, LLMConfig, RouterConfig, TurnEvent};
