//! JSON response types returned by the HTTP API and CLI commands.
//!
//! These mirror the dashboard's wire contract: mutation endpoints answer
//! `{"status": "ok", ...}`, list endpoints answer typed arrays.

use serde::{Deserialize, Serialize};

use crate::entities::{Milestone, MilestoneLog, ProgressSnapshot, ProgressStats, Project};

fn ok() -> String {
    "ok".to_string()
}

/// Generic `{"status": "ok"}` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OkResponse {
    #[serde(default = "ok")]
    pub status: String,
}

impl Default for OkResponse {
    fn default() -> Self {
        Self { status: ok() }
    }
}

/// Response from decision creation: `{status, decision_id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecisionCreateResponse {
    #[serde(default = "ok")]
    pub status: String,
    pub decision_id: i64,
}

impl DecisionCreateResponse {
    #[must_use]
    pub fn new(decision_id: i64) -> Self {
        Self { status: ok(), decision_id }
    }
}

/// Response from milestone creation: `{status, slug}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MilestoneCreateResponse {
    #[serde(default = "ok")]
    pub status: String,
    pub slug: String,
}

impl MilestoneCreateResponse {
    #[must_use]
    pub fn new(slug: String) -> Self {
        Self { status: ok(), slug }
    }
}

/// Response from log creation/editing: `{status, log}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogResponse {
    #[serde(default = "ok")]
    pub status: String,
    pub log: MilestoneLog,
}

impl LogResponse {
    #[must_use]
    pub fn new(log: MilestoneLog) -> Self {
        Self { status: ok(), log }
    }
}

/// Response from a progress reset: `{status, snapshot}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotResponse {
    #[serde(default = "ok")]
    pub status: String,
    pub snapshot: ProgressSnapshot,
}

impl SnapshotResponse {
    #[must_use]
    pub fn new(snapshot: ProgressSnapshot) -> Self {
        Self { status: ok(), snapshot }
    }
}

/// Response from `GET /api/milestones`: project info, the milestone list,
/// and progress for the current period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MilestonesResponse {
    pub project: Project,
    pub milestones: Vec<Milestone>,
    pub progress: ProgressStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_response_shape() {
        let json = serde_json::to_value(OkResponse::default()).unwrap();
        assert_eq!(json, serde_json::json!({"status": "ok"}));
    }

    #[test]
    fn decision_create_response_shape() {
        let json = serde_json::to_value(DecisionCreateResponse::new(7)).unwrap();
        assert_eq!(json, serde_json::json!({"status": "ok", "decision_id": 7}));
    }
}
