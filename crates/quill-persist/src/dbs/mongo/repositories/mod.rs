mod draft;
mod feedback;
mod message;
mod scheduled;
mod thread;

pub use draft::MongoDraftRepository;
pub use feedback::MongoFeedbackRepository;
pub use message::MongoMessageRepository;
pub use scheduled::MongoScheduledRepository;
pub use thread::{MongoThread, MongoThreadRepository};
