//! Status enums and relation types for Milstone.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! and store their `as_str()` form in SQL. User-facing input strings go through
//! `from_input`, which trims, lowercases, and applies legacy aliases.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// MilestoneStatus
// ---------------------------------------------------------------------------

/// Status of a milestone. Entering `done` stamps `completed_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    Active,
    Done,
}

impl MilestoneStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Done => "done",
        }
    }

    /// Canonicalize a user-supplied status string. `planned` is a legacy
    /// alias for `active`.
    #[must_use]
    pub fn from_input(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "active" | "planned" => Some(Self::Active),
            "done" => Some(Self::Done),
            _ => None,
        }
    }
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DecisionStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a decision record.
///
/// Only `accepted` decisions participate in the active-decision view; an
/// accepted decision directly overridden by another accepted decision is no
/// longer active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Proposed,
    Accepted,
    Rejected,
    Deprecated,
    Superseded,
}

impl DecisionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Proposed => "proposed",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Deprecated => "deprecated",
            Self::Superseded => "superseded",
        }
    }

    /// Canonicalize a user-supplied status string.
    #[must_use]
    pub fn from_input(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "proposed" => Some(Self::Proposed),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            "deprecated" => Some(Self::Deprecated),
            "superseded" => Some(Self::Superseded),
            _ => None,
        }
    }
}

impl fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RequestStatus
// ---------------------------------------------------------------------------

/// Status of an override request.
///
/// ```text
/// pending → approved
///         → rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Approved, Self::Rejected],
            Self::Approved | Self::Rejected => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Canonicalize a user-supplied status string.
    #[must_use]
    pub fn from_input(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RelationType
// ---------------------------------------------------------------------------

/// How a decision relates to a milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    MadeFor,
    Affects,
    Implements,
    BlockedBy,
}

impl RelationType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MadeFor => "made_for",
            Self::Affects => "affects",
            Self::Implements => "implements",
            Self::BlockedBy => "blocked_by",
        }
    }

    /// Canonicalize a user-supplied relation string.
    #[must_use]
    pub fn from_input(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "made_for" => Some(Self::MadeFor),
            "affects" => Some(Self::Affects),
            "implements" => Some(Self::Implements),
            "blocked_by" => Some(Self::BlockedBy),
            _ => None,
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected_str:expr) => {
            #[test]
            fn $name() {
                let val = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected_str));
                let recovered: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(recovered, val);
            }
        };
    }

    test_serde_roundtrip!(
        milestone_active,
        MilestoneStatus,
        MilestoneStatus::Active,
        "active"
    );
    test_serde_roundtrip!(milestone_done, MilestoneStatus, MilestoneStatus::Done, "done");

    test_serde_roundtrip!(
        decision_proposed,
        DecisionStatus,
        DecisionStatus::Proposed,
        "proposed"
    );
    test_serde_roundtrip!(
        decision_superseded,
        DecisionStatus,
        DecisionStatus::Superseded,
        "superseded"
    );

    test_serde_roundtrip!(request_pending, RequestStatus, RequestStatus::Pending, "pending");

    test_serde_roundtrip!(relation_made_for, RelationType, RelationType::MadeFor, "made_for");
    test_serde_roundtrip!(
        relation_blocked_by,
        RelationType,
        RelationType::BlockedBy,
        "blocked_by"
    );

    #[test]
    fn milestone_status_planned_alias() {
        assert_eq!(MilestoneStatus::from_input("planned"), Some(MilestoneStatus::Active));
        assert_eq!(MilestoneStatus::from_input(" Done "), Some(MilestoneStatus::Done));
        assert_eq!(MilestoneStatus::from_input("finished"), None);
    }

    #[test]
    fn decision_status_from_input_rejects_unknown() {
        assert_eq!(DecisionStatus::from_input("accepted"), Some(DecisionStatus::Accepted));
        assert_eq!(DecisionStatus::from_input("ACCEPTED"), Some(DecisionStatus::Accepted));
        assert_eq!(DecisionStatus::from_input("approved"), None);
    }

    #[test]
    fn request_status_transitions() {
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Approved));
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Rejected));
        assert!(!RequestStatus::Approved.can_transition_to(RequestStatus::Pending));
        assert!(RequestStatus::Rejected.allowed_next_states().is_empty());
    }

    #[test]
    fn request_status_from_input() {
        assert_eq!(RequestStatus::from_input(" Pending "), Some(RequestStatus::Pending));
        assert_eq!(RequestStatus::from_input("open"), None);
    }

    #[test]
    fn relation_type_from_input() {
        assert_eq!(RelationType::from_input("implements"), Some(RelationType::Implements));
        assert_eq!(RelationType::from_input("causes"), None);
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(format!("{}", MilestoneStatus::Active), "active");
        assert_eq!(format!("{}", DecisionStatus::Deprecated), "deprecated");
        assert_eq!(format!("{}", RequestStatus::Approved), "approved");
        assert_eq!(format!("{}", RelationType::BlockedBy), "blocked_by");
    }
}
