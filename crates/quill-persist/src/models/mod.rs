mod draft;
mod feedback;
mod message;
mod scheduled;
mod thread;

pub use draft::{Draft, DraftRevision, DraftVersion, NewVersion, UpsertOutcome};
pub use feedback::{Feedback, FeedbackKind};
pub use message::{Message, MessageRole, NewMessage};
pub use scheduled::{
    NewScheduledDraft, ScheduleFilter, ScheduleStatus, ScheduledDraft, ScheduledDraftPatch,
};
pub use thread::{OrgScope, Principal, Thread};

/// First line of `text`, trimmed and cut to at most `max_chars` characters
pub fn title_from(text: &str, max_chars: usize) -> Option<String> {
    let line = text.lines().map(str::trim).find(|l| !l.is_empty())?;
    Some(line.chars().take(max_chars).collect::<String>().trim_end().to_string())
}
