use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A progress note logged against a milestone. `sequence` increases
/// monotonically per milestone and is the user-facing handle for edits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MilestoneLog {
    pub id: i64,
    pub milestone_id: i64,
    pub sequence: i64,
    pub author: Option<String>,
    pub summary: String,
    pub status: Option<String>,
    pub progress: Option<i64>,
    pub created_at: DateTime<Utc>,
}
