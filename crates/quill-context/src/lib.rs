mod assembler;
mod default;
mod error;
mod history;
mod strategy;
mod templates;

pub use assembler::{ContextAssembler, ContextData};
pub use default::DefaultContextStrategy;
pub use error::{ContextError, Result};
pub use history::HistoryWindow;
pub use strategy::{ContextStrategy, ContextWindow};
pub use templates::{
    DRAFT_TEMPLATE, EDIT_TEMPLATE, FEEDBACK_TEMPLATE, GENERIC_TEMPLATE, IDEATE_TEMPLATE,
};
