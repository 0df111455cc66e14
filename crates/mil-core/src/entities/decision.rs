use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::authority::AuthorityLevel;
use crate::enums::DecisionStatus;

/// A recorded choice with rationale, authority metadata, and lifecycle status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Decision {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    /// The decision itself. Required, unlike the rationale fields.
    pub decision_text: String,
    pub context: Option<String>,
    pub alternatives: Option<String>,
    pub consequences: Option<String>,
    pub tags: Option<String>,
    pub status: DecisionStatus,
    /// Minimum authority needed to override this decision.
    pub required_level: AuthorityLevel,
    pub maker: String,
    /// The maker's authority at creation time. Immutable snapshot; never
    /// re-derived from the policy after creation.
    pub maker_level: AuthorityLevel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact reference to a decision on the other end of an override edge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecisionRef {
    pub id: i64,
    pub title: String,
    pub status: DecisionStatus,
}

/// A milestone linked to a decision, as shown in the decision detail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkedMilestoneRef {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub note: Option<String>,
}

/// Full decision detail: the record plus both sides of the override graph
/// and the linked milestones grouped by relation type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecisionDetail {
    #[serde(flatten)]
    pub decision: Decision,
    /// Decisions this decision overrides (outgoing edges).
    pub overrides: Vec<DecisionRef>,
    /// Decisions that override this decision (incoming edges).
    pub overridden_by: Vec<DecisionRef>,
    /// Linked milestones keyed by relation type (`made_for`, `affects`, ...).
    pub milestones: BTreeMap<String, Vec<LinkedMilestoneRef>>,
}

/// Compact listing row: decision fields plus edge and link counts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecisionSummary {
    pub id: i64,
    pub title: String,
    pub status: DecisionStatus,
    pub required_level: AuthorityLevel,
    pub maker: String,
    pub maker_level: AuthorityLevel,
    pub tags: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Outgoing override edges (decisions this one overrides).
    pub overrides_count: i64,
    /// Incoming override edges (decisions overriding this one).
    pub overridden_by_count: i64,
    /// Distinct milestones linked to this decision.
    pub milestone_count: i64,
}
