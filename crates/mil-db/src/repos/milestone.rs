//! Milestone repository — CRUD, slug generation, soft delete, period listing.

use chrono::{DateTime, Utc};

use mil_core::entities::Milestone;
use mil_core::enums::MilestoneStatus;

use crate::error::StoreError;
use crate::helpers::{
    get_opt_string, parse_datetime, parse_enum, parse_flexible_datetime, parse_optional_datetime,
};
use crate::service::MilService;

const SELECT_COLS: &str = "id, project_id, slug, title, description, status, priority, owner, \
     start_date, due_date, completed_at, parent_id, deleted, expected_hours, created_at, updated_at";

pub(crate) fn row_to_milestone(row: &libsql::Row) -> Result<Milestone, StoreError> {
    Ok(Milestone {
        id: row.get(0)?,
        project_id: row.get(1)?,
        slug: row.get(2)?,
        title: row.get(3)?,
        description: get_opt_string(row, 4)?,
        status: parse_enum(&row.get::<String>(5)?)?,
        priority: row.get(6)?,
        owner: get_opt_string(row, 7)?,
        start_date: get_opt_string(row, 8)?,
        due_date: get_opt_string(row, 9)?,
        completed_at: parse_optional_datetime(get_opt_string(row, 10)?.as_deref())?,
        parent_id: row.get::<Option<i64>>(11)?,
        deleted: row.get::<i64>(12)? != 0,
        expected_hours: row.get(13)?,
        created_at: parse_datetime(&row.get::<String>(14)?)?,
        updated_at: parse_datetime(&row.get::<String>(15)?)?,
    })
}

/// Reduce a title to a URL-safe slug: lowercase ASCII alphanumerics with
/// single dashes between runs of anything else.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for c in title.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "milestone".to_string()
    } else {
        slug
    }
}

/// Whether a milestone's activity window overlaps the period opened at
/// `since`.
///
/// The window runs from `start_date` (falling back to `created_at`) to
/// `completed_at` (falling back to `due_date`, then to now for open-ended
/// milestones). A milestone whose window closed before the period began, or
/// whose start lies in the future, is out of period; one with no dates at
/// all is always in period.
fn milestone_in_period(milestone: &Milestone, since: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    let start = milestone
        .start_date
        .as_deref()
        .and_then(parse_flexible_datetime)
        .unwrap_or(milestone.created_at);
    let end = milestone
        .completed_at
        .or_else(|| milestone.due_date.as_deref().and_then(parse_flexible_datetime))
        .unwrap_or(now);
    end >= since && start <= now
}

/// Input for milestone creation. Only `title` is required.
#[derive(Debug, Clone, Default)]
pub struct MilestoneDraft {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: i64,
    pub owner: Option<String>,
    pub start_date: Option<String>,
    pub due_date: Option<String>,
    pub parent_slug: Option<String>,
    pub expected_hours: f64,
}

impl MilestoneDraft {
    #[must_use]
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }
}

/// Partial milestone update. Outer `None` leaves a field untouched; inner
/// `None` clears a nullable column.
#[derive(Debug, Clone, Default)]
pub struct MilestoneUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<String>,
    pub priority: Option<i64>,
    pub owner: Option<Option<String>>,
    pub start_date: Option<Option<String>>,
    pub due_date: Option<Option<String>>,
    pub parent_slug: Option<Option<String>>,
    pub expected_hours: Option<f64>,
}

impl MilService {
    /// Create a milestone and return its generated slug.
    ///
    /// The slug derives from the title; collisions within the project get a
    /// numeric suffix (`ship-v1`, `ship-v1-2`, ...). A status of `planned`
    /// is folded into `active`; `done` stamps `completed_at` immediately.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` for an empty title or unknown status,
    /// `StoreError::NotFound` when `parent_slug` does not resolve.
    pub async fn create_milestone(
        &self,
        project_id: i64,
        draft: MilestoneDraft,
    ) -> Result<String, StoreError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(StoreError::Validation("milestone title must not be empty".into()));
        }

        let status = match draft.status.as_deref() {
            None => MilestoneStatus::Active,
            Some(raw) => MilestoneStatus::from_input(raw).ok_or_else(|| {
                StoreError::Validation(format!("unknown milestone status '{raw}'"))
            })?,
        };

        let parent_id = match draft.parent_slug.as_deref() {
            Some(parent_slug) => Some(self.milestone_id_by_slug(project_id, parent_slug).await?),
            None => None,
        };

        let slug = self.generate_slug(project_id, title).await?;
        let now = Utc::now();
        let completed_at = match status {
            MilestoneStatus::Done => Some(now.to_rfc3339()),
            MilestoneStatus::Active => None,
        };

        self.db()
            .conn()
            .execute(
                "INSERT INTO milestones (project_id, slug, title, description, status, priority, owner, \
                 start_date, due_date, completed_at, parent_id, expected_hours, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                libsql::params![
                    project_id,
                    slug.as_str(),
                    title,
                    draft.description,
                    status.as_str(),
                    draft.priority,
                    draft.owner,
                    draft.start_date,
                    draft.due_date,
                    completed_at,
                    parent_id,
                    draft.expected_hours,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(slug)
    }

    /// Fetch a non-deleted milestone by slug.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the slug does not resolve or the
    /// milestone is soft-deleted.
    pub async fn get_milestone(
        &self,
        project_id: i64,
        slug: &str,
    ) -> Result<Milestone, StoreError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM milestones \
                     WHERE project_id = ?1 AND slug = ?2 AND deleted = 0"
                ),
                libsql::params![project_id, slug],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("milestone '{slug}'")))?;
        row_to_milestone(&row)
    }

    /// Resolve a slug to the milestone id. The identity lookup used by the
    /// decision-link layer.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the slug does not resolve.
    pub async fn milestone_id_by_slug(
        &self,
        project_id: i64,
        slug: &str,
    ) -> Result<i64, StoreError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id FROM milestones WHERE project_id = ?1 AND slug = ?2 AND deleted = 0",
                libsql::params![project_id, slug],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("milestone '{slug}'")))?;
        Ok(row.get(0)?)
    }

    /// Apply a partial update to a milestone, returning the new state.
    ///
    /// Moving to `done` stamps `completed_at` if unset; moving back to
    /// `active` clears it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for a missing milestone or parent slug,
    /// `StoreError::Validation` for an unknown status.
    pub async fn update_milestone(
        &self,
        project_id: i64,
        slug: &str,
        update: MilestoneUpdate,
    ) -> Result<Milestone, StoreError> {
        let current = self.get_milestone(project_id, slug).await?;

        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1usize;

        if let Some(ref title) = update.title {
            if title.trim().is_empty() {
                return Err(StoreError::Validation("milestone title must not be empty".into()));
            }
            sets.push(format!("title = ?{idx}"));
            params.push(title.trim().into());
            idx += 1;
        }
        if let Some(ref description) = update.description {
            sets.push(format!("description = ?{idx}"));
            params.push(description.clone().map_or(libsql::Value::Null, Into::into));
            idx += 1;
        }
        if let Some(ref raw) = update.status {
            let status = MilestoneStatus::from_input(raw).ok_or_else(|| {
                StoreError::Validation(format!("unknown milestone status '{raw}'"))
            })?;
            sets.push(format!("status = ?{idx}"));
            params.push(status.as_str().into());
            idx += 1;

            sets.push(format!("completed_at = ?{idx}"));
            let completed = match status {
                MilestoneStatus::Done => current
                    .completed_at
                    .map_or_else(|| Utc::now().to_rfc3339().into(), |at| at.to_rfc3339().into()),
                MilestoneStatus::Active => libsql::Value::Null,
            };
            params.push(completed);
            idx += 1;
        }
        if let Some(priority) = update.priority {
            sets.push(format!("priority = ?{idx}"));
            params.push(priority.into());
            idx += 1;
        }
        if let Some(ref owner) = update.owner {
            sets.push(format!("owner = ?{idx}"));
            params.push(owner.clone().map_or(libsql::Value::Null, Into::into));
            idx += 1;
        }
        if let Some(ref start_date) = update.start_date {
            sets.push(format!("start_date = ?{idx}"));
            params.push(start_date.clone().map_or(libsql::Value::Null, Into::into));
            idx += 1;
        }
        if let Some(ref due_date) = update.due_date {
            sets.push(format!("due_date = ?{idx}"));
            params.push(due_date.clone().map_or(libsql::Value::Null, Into::into));
            idx += 1;
        }
        if let Some(ref parent_slug) = update.parent_slug {
            let parent_id = match parent_slug.as_deref() {
                Some(parent_slug) => {
                    let id = self.milestone_id_by_slug(project_id, parent_slug).await?;
                    if id == current.id {
                        return Err(StoreError::Validation(
                            "milestone cannot be its own parent".into(),
                        ));
                    }
                    Some(id)
                }
                None => None,
            };
            sets.push(format!("parent_id = ?{idx}"));
            params.push(parent_id.map_or(libsql::Value::Null, Into::into));
            idx += 1;
        }
        if let Some(expected_hours) = update.expected_hours {
            sets.push(format!("expected_hours = ?{idx}"));
            params.push(expected_hours.into());
            idx += 1;
        }

        if sets.is_empty() {
            return Ok(current);
        }

        sets.push(format!("updated_at = ?{idx}"));
        params.push(Utc::now().to_rfc3339().into());
        idx += 1;

        params.push(current.id.into());
        let sql = format!("UPDATE milestones SET {} WHERE id = ?{idx}", sets.join(", "));
        self.db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        self.get_milestone(project_id, slug).await
    }

    /// Soft-delete a milestone. History (logs, links) is preserved.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the slug does not resolve.
    pub async fn delete_milestone(&self, project_id: i64, slug: &str) -> Result<(), StoreError> {
        let id = self.milestone_id_by_slug(project_id, slug).await?;
        self.db()
            .conn()
            .execute(
                "UPDATE milestones SET deleted = 1, updated_at = ?1 WHERE id = ?2",
                libsql::params![Utc::now().to_rfc3339(), id],
            )
            .await?;
        Ok(())
    }

    /// List milestones for a project, ordered by ascending priority (lower
    /// numbers rank first) then due date, undated last.
    ///
    /// With `since` set, only milestones whose activity window overlaps the
    /// current period are returned.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on query failure.
    pub async fn list_milestones(
        &self,
        project_id: i64,
        include_deleted: bool,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Milestone>, StoreError> {
        let deleted_filter = if include_deleted { "" } else { "AND deleted = 0" };
        let sql = format!(
            "SELECT {SELECT_COLS} FROM milestones WHERE project_id = ?1 {deleted_filter} \
             ORDER BY priority ASC, due_date IS NULL, due_date, created_at"
        );
        let mut rows = self.db().conn().query(&sql, [project_id]).await?;

        let now = Utc::now();
        let mut milestones = Vec::new();
        while let Some(row) = rows.next().await? {
            let milestone = row_to_milestone(&row)?;
            if let Some(since) = since {
                if !milestone_in_period(&milestone, since, now) {
                    continue;
                }
            }
            milestones.push(milestone);
        }
        Ok(milestones)
    }

    /// Generate a project-unique slug for a title, suffixing `-2`, `-3`, ...
    /// on collision. Deleted milestones still occupy their slug.
    async fn generate_slug(&self, project_id: i64, title: &str) -> Result<String, StoreError> {
        let base = slugify(title);
        let mut candidate = base.clone();
        let mut n = 2u32;
        loop {
            let mut rows = self
                .db()
                .conn()
                .query(
                    "SELECT 1 FROM milestones WHERE project_id = ?1 AND slug = ?2",
                    libsql::params![project_id, candidate.as_str()],
                )
                .await?;
            if rows.next().await?.is_none() {
                return Ok(candidate);
            }
            candidate = format!("{base}-{n}");
            n += 1;
        }
    }
}
