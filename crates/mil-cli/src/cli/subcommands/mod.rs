mod decision;
mod log;
mod milestone;
mod progress;
mod project;
mod request;
mod serve;

pub use decision::DecisionCommands;
pub use log::LogCommands;
pub use milestone::MilestoneCommands;
pub use progress::ProgressCommands;
pub use project::ProjectCommands;
pub use request::RequestCommands;
pub use serve::ServeArgs;
