//! Entity structs for all Milstone domain objects.
//!
//! Each entity maps to a table in the per-project SQLite database. All
//! structs derive `Serialize`/`Deserialize` for JSON roundtrip through the
//! HTTP API and CLI output.

mod decision;
mod link;
mod log;
mod milestone;
mod project;
mod request;
mod snapshot;

pub use decision::{Decision, DecisionDetail, DecisionRef, DecisionSummary, LinkedMilestoneRef};
pub use link::MilestoneDecisionLink;
pub use log::MilestoneLog;
pub use milestone::Milestone;
pub use project::Project;
pub use request::OverrideRequest;
pub use snapshot::{ProgressSnapshot, ProgressStats};
