use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::authority::AuthorityLevel;
use crate::enums::RequestStatus;

/// A moderated proposal to override a decision, pending reviewer action.
///
/// Created in `pending` state regardless of the requester's authority; the
/// authority gate applies only if a reviewer later performs the actual
/// override.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OverrideRequest {
    pub id: i64,
    pub project_id: i64,
    /// The decision the requester wants overridden.
    pub decision_id: i64,
    pub requester: String,
    /// The requester's authority at submission time (snapshot).
    pub requester_level: AuthorityLevel,
    pub message: String,
    pub proposed_summary: Option<String>,
    pub status: RequestStatus,
    pub reviewer: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
