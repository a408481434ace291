pub mod drafts;
pub mod feedback;
pub mod health;
pub mod messages;
pub mod scheduled;
pub mod threads;
