//! Milestone log repository — append-only progress notes with per-milestone
//! sequence numbers.

use chrono::Utc;

use mil_core::entities::MilestoneLog;
use mil_core::enums::MilestoneStatus;

use crate::error::StoreError;
use crate::helpers::{get_opt_string, parse_datetime};
use crate::service::MilService;

const SELECT_COLS: &str =
    "id, milestone_id, sequence, author, summary, status, progress, created_at";

fn row_to_log(row: &libsql::Row) -> Result<MilestoneLog, StoreError> {
    Ok(MilestoneLog {
        id: row.get(0)?,
        milestone_id: row.get(1)?,
        sequence: row.get(2)?,
        author: get_opt_string(row, 3)?,
        summary: row.get(4)?,
        status: get_opt_string(row, 5)?,
        progress: row.get::<Option<i64>>(6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

fn validate_progress(progress: Option<i64>) -> Result<(), StoreError> {
    match progress {
        Some(p) if !(0..=100).contains(&p) => Err(StoreError::Validation(format!(
            "progress must be between 0 and 100, got {p}"
        ))),
        _ => Ok(()),
    }
}

fn canonical_log_status(status: Option<&str>) -> Result<Option<&'static str>, StoreError> {
    match status {
        None => Ok(None),
        Some(raw) => MilestoneStatus::from_input(raw)
            .map(|s| Some(s.as_str()))
            .ok_or_else(|| StoreError::Validation(format!("unknown milestone status '{raw}'"))),
    }
}

/// Input for a new log entry. Only `summary` is required.
#[derive(Debug, Clone, Default)]
pub struct LogDraft {
    pub summary: String,
    pub author: Option<String>,
    pub status: Option<String>,
    pub progress: Option<i64>,
}

impl LogDraft {
    #[must_use]
    pub fn new(summary: &str) -> Self {
        Self {
            summary: summary.to_string(),
            ..Self::default()
        }
    }
}

/// Partial edit of an existing log entry, addressed by sequence number.
#[derive(Debug, Clone, Default)]
pub struct LogEdit {
    pub summary: Option<String>,
    pub status: Option<Option<String>>,
    pub progress: Option<Option<i64>>,
}

impl MilService {
    /// Append a log entry to a milestone. Sequence numbers start at 1 and
    /// increase by one per milestone.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` for an empty summary, out-of-range
    /// progress, or unknown status; `StoreError::NotFound` for a missing
    /// milestone.
    pub async fn add_log(
        &self,
        project_id: i64,
        slug: &str,
        draft: LogDraft,
    ) -> Result<MilestoneLog, StoreError> {
        let summary = draft.summary.trim();
        if summary.is_empty() {
            return Err(StoreError::Validation("log summary must not be empty".into()));
        }
        validate_progress(draft.progress)?;
        let status = canonical_log_status(draft.status.as_deref())?;

        let milestone_id = self.milestone_id_by_slug(project_id, slug).await?;
        let now = Utc::now();

        let tx = self.db().conn().transaction().await?;
        let mut rows = tx
            .query(
                "SELECT COALESCE(MAX(sequence), 0) + 1 FROM milestone_updates WHERE milestone_id = ?1",
                [milestone_id],
            )
            .await?;
        let sequence: i64 = rows.next().await?.ok_or(StoreError::NoResult)?.get(0)?;

        tx.execute(
            "INSERT INTO milestone_updates (milestone_id, sequence, author, summary, status, progress, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            libsql::params![
                milestone_id,
                sequence,
                draft.author,
                summary,
                status,
                draft.progress,
                now.to_rfc3339()
            ],
        )
        .await?;
        tx.commit().await?;

        self.get_log(milestone_id, sequence).await
    }

    /// List a milestone's log entries in sequence order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for a missing milestone.
    pub async fn list_logs(
        &self,
        project_id: i64,
        slug: &str,
    ) -> Result<Vec<MilestoneLog>, StoreError> {
        let milestone_id = self.milestone_id_by_slug(project_id, slug).await?;
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM milestone_updates \
                     WHERE milestone_id = ?1 ORDER BY sequence"
                ),
                [milestone_id],
            )
            .await?;

        let mut logs = Vec::new();
        while let Some(row) = rows.next().await? {
            logs.push(row_to_log(&row)?);
        }
        Ok(logs)
    }

    /// Edit an existing log entry addressed by its sequence number.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for a missing milestone or sequence,
    /// `StoreError::Validation` for bad field values.
    pub async fn edit_log(
        &self,
        project_id: i64,
        slug: &str,
        sequence: i64,
        edit: LogEdit,
    ) -> Result<MilestoneLog, StoreError> {
        let milestone_id = self.milestone_id_by_slug(project_id, slug).await?;
        let current = self.get_log(milestone_id, sequence).await?;

        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1usize;

        if let Some(ref summary) = edit.summary {
            if summary.trim().is_empty() {
                return Err(StoreError::Validation("log summary must not be empty".into()));
            }
            sets.push(format!("summary = ?{idx}"));
            params.push(summary.trim().into());
            idx += 1;
        }
        if let Some(ref status) = edit.status {
            let canonical = canonical_log_status(status.as_deref())?;
            sets.push(format!("status = ?{idx}"));
            params.push(canonical.map_or(libsql::Value::Null, Into::into));
            idx += 1;
        }
        if let Some(progress) = edit.progress {
            validate_progress(progress)?;
            sets.push(format!("progress = ?{idx}"));
            params.push(progress.map_or(libsql::Value::Null, Into::into));
            idx += 1;
        }

        if sets.is_empty() {
            return Ok(current);
        }

        params.push(current.id.into());
        let sql = format!("UPDATE milestone_updates SET {} WHERE id = ?{idx}", sets.join(", "));
        self.db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        self.get_log(milestone_id, sequence).await
    }

    async fn get_log(&self, milestone_id: i64, sequence: i64) -> Result<MilestoneLog, StoreError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM milestone_updates \
                     WHERE milestone_id = ?1 AND sequence = ?2"
                ),
                libsql::params![milestone_id, sequence],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("log entry #{sequence}")))?;
        row_to_log(&row)
    }
}
