mod drafts;
mod feedback;
mod schedule;
mod threads;

pub use drafts::DraftService;
pub use feedback::FeedbackService;
pub use schedule::{CalendarDay, ScheduleService};
pub use threads::ThreadService;
