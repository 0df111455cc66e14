//! Override request repository — the moderated path for challenging a
//! decision without the authority to override it directly.
//!
//! A request is always created `pending`, whatever the requester's level;
//! approving one records the reviewer's verdict but never writes override
//! edges itself.

use chrono::Utc;

use mil_core::entities::OverrideRequest;
use mil_core::enums::RequestStatus;

use crate::error::StoreError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_level, parse_optional_datetime};
use crate::service::MilService;

const SELECT_COLS: &str = "id, project_id, decision_id, requester, requester_level, message, \
     proposed_summary, status, reviewer, resolved_at, created_at";

fn row_to_request(row: &libsql::Row) -> Result<OverrideRequest, StoreError> {
    Ok(OverrideRequest {
        id: row.get(0)?,
        project_id: row.get(1)?,
        decision_id: row.get(2)?,
        requester: row.get(3)?,
        requester_level: parse_level(row, 4)?,
        message: row.get(5)?,
        proposed_summary: get_opt_string(row, 6)?,
        status: parse_enum(&row.get::<String>(7)?)?,
        reviewer: get_opt_string(row, 8)?,
        resolved_at: parse_optional_datetime(get_opt_string(row, 9)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

impl MilService {
    /// File an override request against a decision. The requester's level is
    /// snapshotted from the policy; no authority check applies here.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` for empty requester or message,
    /// `StoreError::NotFound` for a missing decision,
    /// `StoreError::Policy` if the requester's configured level is invalid.
    pub async fn request_override(
        &self,
        project_id: i64,
        decision_id: i64,
        requester: &str,
        message: &str,
        proposed_summary: Option<&str>,
    ) -> Result<OverrideRequest, StoreError> {
        let requester = requester.trim();
        if requester.is_empty() {
            return Err(StoreError::Validation("requester must not be empty".into()));
        }
        let message = message.trim();
        if message.is_empty() {
            return Err(StoreError::Validation("request message must not be empty".into()));
        }

        // Existence gate before the insert; FK alone would surface as a
        // constraint failure, not NotFound.
        self.get_decision_record(project_id, decision_id).await?;

        let requester_level = self.policy().level_of(requester)?;
        let now = Utc::now();

        self.db()
            .conn()
            .execute(
                "INSERT INTO override_requests \
                 (project_id, decision_id, requester, requester_level, message, proposed_summary, status, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                libsql::params![
                    project_id,
                    decision_id,
                    requester,
                    i64::from(requester_level),
                    message,
                    proposed_summary,
                    RequestStatus::Pending.as_str(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        let request_id = self.db().conn().last_insert_rowid();
        self.get_override_request(project_id, request_id).await
    }

    /// Fetch one override request.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the id does not belong to the
    /// project.
    pub async fn get_override_request(
        &self,
        project_id: i64,
        request_id: i64,
    ) -> Result<OverrideRequest, StoreError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM override_requests WHERE project_id = ?1 AND id = ?2"
                ),
                libsql::params![project_id, request_id],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("override request {request_id}")))?;
        row_to_request(&row)
    }

    /// Approve or reject a pending request, recording the reviewer and
    /// resolution time.
    ///
    /// Approval is a verdict only: performing the actual override stays a
    /// separate, authority-gated operation.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for a missing request,
    /// `StoreError::InvalidState` if the request is already resolved,
    /// `StoreError::Validation` for an empty reviewer.
    pub async fn resolve_override_request(
        &self,
        project_id: i64,
        request_id: i64,
        approve: bool,
        reviewer: &str,
    ) -> Result<OverrideRequest, StoreError> {
        let reviewer = reviewer.trim();
        if reviewer.is_empty() {
            return Err(StoreError::Validation("reviewer must not be empty".into()));
        }

        let current = self.get_override_request(project_id, request_id).await?;
        let next = if approve {
            RequestStatus::Approved
        } else {
            RequestStatus::Rejected
        };
        if !current.status.can_transition_to(next) {
            return Err(StoreError::InvalidState(format!(
                "cannot move override request {request_id} from {} to {next}",
                current.status
            )));
        }

        self.db()
            .conn()
            .execute(
                "UPDATE override_requests SET status = ?1, reviewer = ?2, resolved_at = ?3 WHERE id = ?4",
                libsql::params![
                    next.as_str(),
                    reviewer,
                    Utc::now().to_rfc3339(),
                    request_id
                ],
            )
            .await?;

        self.get_override_request(project_id, request_id).await
    }

    /// List override requests, newest first, optionally narrowed by status
    /// or decision.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on query failure.
    pub async fn list_override_requests(
        &self,
        project_id: i64,
        status: Option<RequestStatus>,
        decision_id: Option<i64>,
    ) -> Result<Vec<OverrideRequest>, StoreError> {
        let mut conditions = vec!["project_id = ?1".to_string()];
        let mut params: Vec<libsql::Value> = vec![project_id.into()];

        if let Some(status) = status {
            conditions.push(format!("status = ?{}", params.len() + 1));
            params.push(status.as_str().into());
        }
        if let Some(decision_id) = decision_id {
            conditions.push(format!("decision_id = ?{}", params.len() + 1));
            params.push(decision_id.into());
        }

        let sql = format!(
            "SELECT {SELECT_COLS} FROM override_requests WHERE {} ORDER BY created_at DESC, id DESC",
            conditions.join(" AND ")
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;

        let mut requests = Vec::new();
        while let Some(row) = rows.next().await? {
            requests.push(row_to_request(&row)?);
        }
        Ok(requests)
    }
}
