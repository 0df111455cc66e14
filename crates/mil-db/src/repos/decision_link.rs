//! Milestone-decision link repository.
//!
//! Links are typed by relation; the same pair may carry several distinct
//! relations, but never the same one twice.

use chrono::Utc;

use mil_core::entities::MilestoneDecisionLink;
use mil_core::enums::RelationType;

use crate::error::StoreError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum};
use crate::service::MilService;

impl MilService {
    /// Link a decision to a milestone under a relation type.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` when either side is missing,
    /// `StoreError::Validation` for an unknown relation type,
    /// `StoreError::Duplicate` when the identical link already exists.
    pub async fn link_decision(
        &self,
        project_id: i64,
        decision_id: i64,
        milestone_slug: &str,
        relation_type: Option<&str>,
        note: Option<&str>,
    ) -> Result<MilestoneDecisionLink, StoreError> {
        let relation = match relation_type {
            None => RelationType::MadeFor,
            Some(raw) => RelationType::from_input(raw).ok_or_else(|| {
                StoreError::Validation(format!("unknown relation type '{raw}'"))
            })?,
        };

        self.get_decision_record(project_id, decision_id).await?;
        let milestone_id = self.milestone_id_by_slug(project_id, milestone_slug).await?;

        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "INSERT INTO milestone_decisions (milestone_id, decision_id, relation_type, note, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                libsql::params![
                    milestone_id,
                    decision_id,
                    relation.as_str(),
                    note,
                    now.to_rfc3339()
                ],
            )
            .await?;

        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT milestone_id, decision_id, relation_type, note, created_at \
                 FROM milestone_decisions \
                 WHERE milestone_id = ?1 AND decision_id = ?2 AND relation_type = ?3",
                libsql::params![milestone_id, decision_id, relation.as_str()],
            )
            .await?;
        let row = rows.next().await?.ok_or(StoreError::NoResult)?;
        Ok(MilestoneDecisionLink {
            milestone_id: row.get(0)?,
            decision_id: row.get(1)?,
            relation_type: parse_enum(&row.get::<String>(2)?)?,
            note: get_opt_string(&row, 3)?,
            created_at: parse_datetime(&row.get::<String>(4)?)?,
        })
    }
}
