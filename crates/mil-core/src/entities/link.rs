use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::RelationType;

/// A typed association between a decision and a milestone.
///
/// The same pair may be linked under multiple distinct relation types, but
/// the identical (milestone, decision, relation) triple only once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MilestoneDecisionLink {
    pub milestone_id: i64,
    pub decision_id: i64,
    pub relation_type: RelationType,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}
