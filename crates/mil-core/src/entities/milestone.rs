use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::MilestoneStatus;

/// A hierarchical project milestone.
///
/// `start_date` and `due_date` are kept as the raw strings supplied by the
/// caller (date or datetime); the period-window logic parses them leniently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Milestone {
    pub id: i64,
    pub project_id: i64,
    /// URL-safe identifier, unique per project, generated from the title.
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub status: MilestoneStatus,
    pub priority: i64,
    pub owner: Option<String>,
    pub start_date: Option<String>,
    pub due_date: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub parent_id: Option<i64>,
    /// Soft-delete flag; deleted milestones are hidden from listings and
    /// progress stats but keep their history.
    pub deleted: bool,
    pub expected_hours: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
