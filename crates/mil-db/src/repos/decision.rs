//! Decision repository — creation with authority snapshot, detail view,
//! filtered listing, status lifecycle.

use std::collections::BTreeMap;

use chrono::Utc;

use mil_core::authority::AuthorityLevel;
use mil_core::entities::{Decision, DecisionDetail, DecisionRef, DecisionSummary, LinkedMilestoneRef};
use mil_core::enums::{DecisionStatus, RelationType};

use crate::error::StoreError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_level};
use crate::service::MilService;

pub(crate) const SELECT_COLS: &str = "id, project_id, title, decision_text, context, alternatives, \
     consequences, tags, status, required_level, maker, maker_level, created_at, updated_at";

pub(crate) fn row_to_decision(row: &libsql::Row) -> Result<Decision, StoreError> {
    Ok(Decision {
        id: row.get(0)?,
        project_id: row.get(1)?,
        title: row.get(2)?,
        decision_text: row.get(3)?,
        context: get_opt_string(row, 4)?,
        alternatives: get_opt_string(row, 5)?,
        consequences: get_opt_string(row, 6)?,
        tags: get_opt_string(row, 7)?,
        status: parse_enum(&row.get::<String>(8)?)?,
        required_level: parse_level(row, 9)?,
        maker: row.get(10)?,
        maker_level: parse_level(row, 11)?,
        created_at: parse_datetime(&row.get::<String>(12)?)?,
        updated_at: parse_datetime(&row.get::<String>(13)?)?,
    })
}

fn row_to_ref(row: &libsql::Row) -> Result<DecisionRef, StoreError> {
    Ok(DecisionRef {
        id: row.get(0)?,
        title: row.get(1)?,
        status: parse_enum(&row.get::<String>(2)?)?,
    })
}

/// Input for decision creation. `title`, `decision_text`, `required_level`,
/// and `maker` are required; the rest is rationale and an optional initial
/// milestone link.
#[derive(Debug, Clone, Default)]
pub struct DecisionDraft {
    pub title: String,
    pub decision_text: String,
    pub required_level: i64,
    pub maker: String,
    pub status: Option<String>,
    pub context: Option<String>,
    pub alternatives: Option<String>,
    pub consequences: Option<String>,
    pub tags: Option<String>,
    pub milestone_slug: Option<String>,
    pub relation_type: Option<String>,
    pub note: Option<String>,
}

impl DecisionDraft {
    #[must_use]
    pub fn new(title: &str, decision_text: &str, required_level: i64, maker: &str) -> Self {
        Self {
            title: title.to_string(),
            decision_text: decision_text.to_string(),
            required_level,
            maker: maker.to_string(),
            ..Self::default()
        }
    }
}

/// Filters for decision listing. All fields combine with AND; defaults match
/// everything.
#[derive(Debug, Clone, Default)]
pub struct DecisionFilter {
    /// Match any of these statuses; empty matches all.
    pub status: Vec<DecisionStatus>,
    pub required_level: Option<i64>,
    pub maker: Option<String>,
    /// Only decisions linked to this milestone slug.
    pub milestone_slug: Option<String>,
    /// Substring match against title, decision text, and tags.
    pub search: Option<String>,
    /// Substring match against the tags column.
    pub tag: Option<String>,
    /// Only decisions created at or after this instant.
    pub created_from: Option<chrono::DateTime<chrono::Utc>>,
    /// Only decisions created at or before this instant.
    pub created_to: Option<chrono::DateTime<chrono::Utc>>,
}

impl MilService {
    /// Record a decision, snapshotting the maker's authority level from the
    /// policy, and return its id.
    ///
    /// When `milestone_slug` is given, the decision and its initial link are
    /// written in one transaction; a bad slug fails the whole creation.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` for empty required fields, an
    /// out-of-range `required_level`, or an unknown status/relation;
    /// `StoreError::NotFound` for a bad milestone slug;
    /// `StoreError::Policy` if the maker's configured level is invalid.
    pub async fn create_decision(
        &self,
        project_id: i64,
        draft: DecisionDraft,
    ) -> Result<i64, StoreError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(StoreError::Validation("decision title must not be empty".into()));
        }
        let decision_text = draft.decision_text.trim();
        if decision_text.is_empty() {
            return Err(StoreError::Validation("decision text must not be empty".into()));
        }
        let maker = draft.maker.trim();
        if maker.is_empty() {
            return Err(StoreError::Validation("decision maker must not be empty".into()));
        }

        let required_level = AuthorityLevel::new(draft.required_level)
            .map_err(|e| StoreError::Validation(format!("required_level: {e}")))?;
        let status = match draft.status.as_deref() {
            None => DecisionStatus::Proposed,
            Some(raw) => DecisionStatus::from_input(raw).ok_or_else(|| {
                StoreError::Validation(format!("unknown decision status '{raw}'"))
            })?,
        };
        let relation = match draft.relation_type.as_deref() {
            None => RelationType::MadeFor,
            Some(raw) => RelationType::from_input(raw).ok_or_else(|| {
                StoreError::Validation(format!("unknown relation type '{raw}'"))
            })?,
        };

        // Snapshot, never re-derived. Later policy changes do not touch
        // stored decisions.
        let maker_level = self.policy().level_of(maker)?;

        let milestone_id = match draft.milestone_slug.as_deref() {
            Some(slug) => Some(self.milestone_id_by_slug(project_id, slug).await?),
            None => None,
        };

        let now = Utc::now();
        let tx = self.db().conn().transaction().await?;
        tx.execute(
            "INSERT INTO decisions (project_id, title, decision_text, context, alternatives, \
             consequences, tags, status, required_level, maker, maker_level, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            libsql::params![
                project_id,
                title,
                decision_text,
                draft.context,
                draft.alternatives,
                draft.consequences,
                draft.tags,
                status.as_str(),
                i64::from(required_level),
                maker,
                i64::from(maker_level),
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        )
        .await?;
        let decision_id = tx.last_insert_rowid();

        if let Some(milestone_id) = milestone_id {
            tx.execute(
                "INSERT INTO milestone_decisions (milestone_id, decision_id, relation_type, note, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                libsql::params![
                    milestone_id,
                    decision_id,
                    relation.as_str(),
                    draft.note,
                    now.to_rfc3339()
                ],
            )
            .await?;
        }

        tx.commit().await?;
        Ok(decision_id)
    }

    /// Fetch the bare decision record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the id does not belong to the
    /// project.
    pub async fn get_decision_record(
        &self,
        project_id: i64,
        decision_id: i64,
    ) -> Result<Decision, StoreError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM decisions WHERE project_id = ?1 AND id = ?2"),
                libsql::params![project_id, decision_id],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("decision {decision_id}")))?;
        row_to_decision(&row)
    }

    /// Fetch a decision with both sides of its override edges and its linked
    /// milestones grouped by relation type.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the id does not belong to the
    /// project.
    pub async fn get_decision(
        &self,
        project_id: i64,
        decision_id: i64,
    ) -> Result<DecisionDetail, StoreError> {
        let decision = self.get_decision_record(project_id, decision_id).await?;

        let mut overrides = Vec::new();
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT d.id, d.title, d.status FROM decision_overrides o \
                 JOIN decisions d ON d.id = o.overridden_id \
                 WHERE o.overriding_id = ?1 ORDER BY d.id",
                [decision_id],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            overrides.push(row_to_ref(&row)?);
        }

        let mut overridden_by = Vec::new();
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT d.id, d.title, d.status FROM decision_overrides o \
                 JOIN decisions d ON d.id = o.overriding_id \
                 WHERE o.overridden_id = ?1 ORDER BY d.id",
                [decision_id],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            overridden_by.push(row_to_ref(&row)?);
        }

        let mut milestones: BTreeMap<String, Vec<LinkedMilestoneRef>> = BTreeMap::new();
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT md.relation_type, m.id, m.slug, m.title, md.note \
                 FROM milestone_decisions md JOIN milestones m ON m.id = md.milestone_id \
                 WHERE md.decision_id = ?1 ORDER BY md.relation_type, m.slug",
                [decision_id],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            let relation: String = row.get(0)?;
            milestones.entry(relation).or_default().push(LinkedMilestoneRef {
                id: row.get(1)?,
                slug: row.get(2)?,
                title: row.get(3)?,
                note: get_opt_string(&row, 4)?,
            });
        }

        Ok(DecisionDetail {
            decision,
            overrides,
            overridden_by,
            milestones,
        })
    }

    /// List decisions matching a filter, ordered by creation time (oldest
    /// first), with edge and link counts. Listing never mutates state.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` for an out-of-range level filter.
    pub async fn list_decisions(
        &self,
        project_id: i64,
        filter: &DecisionFilter,
    ) -> Result<Vec<DecisionSummary>, StoreError> {
        let mut conditions = vec!["d.project_id = ?1".to_string()];
        let mut params: Vec<libsql::Value> = vec![project_id.into()];

        if !filter.status.is_empty() {
            let placeholders: Vec<String> = filter
                .status
                .iter()
                .enumerate()
                .map(|(offset, _)| format!("?{}", params.len() + 1 + offset))
                .collect();
            conditions.push(format!("d.status IN ({})", placeholders.join(", ")));
            for status in &filter.status {
                params.push(status.as_str().into());
            }
        }
        if let Some(raw) = filter.required_level {
            let level = AuthorityLevel::new(raw)
                .map_err(|e| StoreError::Validation(format!("required_level: {e}")))?;
            conditions.push(format!("d.required_level = ?{}", params.len() + 1));
            params.push(i64::from(level).into());
        }
        if let Some(ref maker) = filter.maker {
            conditions.push(format!("d.maker = ?{}", params.len() + 1));
            params.push(maker.clone().into());
        }
        if let Some(ref slug) = filter.milestone_slug {
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM milestone_decisions md \
                 JOIN milestones m ON m.id = md.milestone_id \
                 WHERE md.decision_id = d.id AND m.slug = ?{} AND m.project_id = d.project_id)",
                params.len() + 1
            ));
            params.push(slug.clone().into());
        }
        if let Some(ref search) = filter.search {
            let idx = params.len() + 1;
            conditions.push(format!(
                "(d.title LIKE '%' || ?{idx} || '%' \
                 OR d.decision_text LIKE '%' || ?{idx} || '%' \
                 OR d.tags LIKE '%' || ?{idx} || '%')"
            ));
            params.push(search.clone().into());
        }
        if let Some(ref tag) = filter.tag {
            conditions.push(format!("d.tags LIKE '%' || ?{} || '%'", params.len() + 1));
            params.push(tag.clone().into());
        }
        // Stored timestamps are uniform RFC 3339 UTC, so string comparison
        // orders correctly.
        if let Some(from) = filter.created_from {
            conditions.push(format!("d.created_at >= ?{}", params.len() + 1));
            params.push(from.to_rfc3339().into());
        }
        if let Some(to) = filter.created_to {
            conditions.push(format!("d.created_at <= ?{}", params.len() + 1));
            params.push(to.to_rfc3339().into());
        }

        let sql = format!(
            "SELECT d.id, d.title, d.status, d.required_level, d.maker, d.maker_level, d.tags, d.created_at, \
             (SELECT COUNT(*) FROM decision_overrides o WHERE o.overriding_id = d.id), \
             (SELECT COUNT(*) FROM decision_overrides o WHERE o.overridden_id = d.id), \
             (SELECT COUNT(DISTINCT md.milestone_id) FROM milestone_decisions md WHERE md.decision_id = d.id) \
             FROM decisions d WHERE {} ORDER BY d.created_at, d.id",
            conditions.join(" AND ")
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;

        let mut summaries = Vec::new();
        while let Some(row) = rows.next().await? {
            summaries.push(DecisionSummary {
                id: row.get(0)?,
                title: row.get(1)?,
                status: parse_enum(&row.get::<String>(2)?)?,
                required_level: parse_level(&row, 3)?,
                maker: row.get(4)?,
                maker_level: parse_level(&row, 5)?,
                tags: get_opt_string(&row, 6)?,
                created_at: parse_datetime(&row.get::<String>(7)?)?,
                overrides_count: row.get(8)?,
                overridden_by_count: row.get(9)?,
                milestone_count: row.get(10)?,
            });
        }
        Ok(summaries)
    }

    /// Move a decision to a new lifecycle status, returning the new state.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the id does not belong to the
    /// project.
    pub async fn update_decision_status(
        &self,
        project_id: i64,
        decision_id: i64,
        status: DecisionStatus,
    ) -> Result<Decision, StoreError> {
        // Existence check first so a bad id surfaces as NotFound, not a
        // silent zero-row update.
        self.get_decision_record(project_id, decision_id).await?;
        self.db()
            .conn()
            .execute(
                "UPDATE decisions SET status = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![status.as_str(), Utc::now().to_rfc3339(), decision_id],
            )
            .await?;
        self.get_decision_record(project_id, decision_id).await
    }
}
