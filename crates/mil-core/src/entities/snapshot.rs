use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point-in-time freeze of a project's progress totals. The latest
/// snapshot's timestamp starts the current reporting period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressSnapshot {
    pub id: i64,
    pub project_id: i64,
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub total_hours: f64,
    pub completed_hours: f64,
    pub total_count: i64,
    pub completed_count: i64,
}

/// Computed progress totals over the current period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressStats {
    /// Start of the current period (latest snapshot), if any.
    pub since: Option<DateTime<Utc>>,
    pub total_hours: f64,
    pub completed_hours: f64,
    pub total_count: i64,
    pub completed_count: i64,
    /// `completed_hours / total_hours`, 0.0 when there is nothing to do.
    pub ratio: f64,
}
