//! Progress snapshot repository — period accounting and reset.
//!
//! The latest snapshot's timestamp opens the current reporting period.
//! Stats count non-deleted milestones that are still open or were completed
//! within the period; recording a snapshot freezes the current totals and
//! starts the next period.

use chrono::{DateTime, Utc};

use mil_core::entities::{ProgressSnapshot, ProgressStats};
use mil_core::enums::MilestoneStatus;

use crate::error::StoreError;
use crate::helpers::parse_datetime;
use crate::service::MilService;

const SELECT_COLS: &str =
    "id, project_id, label, created_at, total_hours, completed_hours, total_count, completed_count";

fn row_to_snapshot(row: &libsql::Row) -> Result<ProgressSnapshot, StoreError> {
    Ok(ProgressSnapshot {
        id: row.get(0)?,
        project_id: row.get(1)?,
        label: row.get(2)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
        total_hours: row.get(4)?,
        completed_hours: row.get(5)?,
        total_count: row.get(6)?,
        completed_count: row.get(7)?,
    })
}

impl MilService {
    /// Timestamp of the latest snapshot, which opens the current period.
    /// `None` when the project has never been snapshotted.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on query failure.
    pub async fn current_period_start(
        &self,
        project_id: i64,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT created_at FROM progress_snapshots \
                 WHERE project_id = ?1 ORDER BY created_at DESC, id DESC LIMIT 1",
                [project_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(parse_datetime(&row.get::<String>(0)?)?)),
            None => Ok(None),
        }
    }

    /// Compute progress totals for the current period.
    ///
    /// The ratio is `completed_hours / total_hours`, or 0.0 when no milestone
    /// carries expected hours.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on query failure.
    pub async fn progress_stats(&self, project_id: i64) -> Result<ProgressStats, StoreError> {
        let since = self.current_period_start(project_id).await?;
        let milestones = self.list_milestones(project_id, false, since).await?;

        let mut stats = ProgressStats {
            since,
            total_hours: 0.0,
            completed_hours: 0.0,
            total_count: 0,
            completed_count: 0,
            ratio: 0.0,
        };
        for milestone in &milestones {
            stats.total_count += 1;
            stats.total_hours += milestone.expected_hours;
            if milestone.status == MilestoneStatus::Done {
                stats.completed_count += 1;
                stats.completed_hours += milestone.expected_hours;
            }
        }

        stats.ratio = if stats.total_hours > 0.0 {
            stats.completed_hours / stats.total_hours
        } else {
            0.0
        };
        Ok(stats)
    }

    /// Freeze the current period's totals into a snapshot, starting the next
    /// period, and return the stored snapshot.
    ///
    /// An omitted label defaults to `Reset YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on query failure.
    pub async fn record_snapshot(
        &self,
        project_id: i64,
        label: Option<&str>,
    ) -> Result<ProgressSnapshot, StoreError> {
        let stats = self.progress_stats(project_id).await?;
        let now = Utc::now();
        let label = label.map_or_else(
            || format!("Reset {}", now.format("%Y-%m-%d")),
            ToString::to_string,
        );

        self.db()
            .conn()
            .execute(
                "INSERT INTO progress_snapshots \
                 (project_id, label, created_at, total_hours, completed_hours, total_count, completed_count) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                libsql::params![
                    project_id,
                    label,
                    now.to_rfc3339(),
                    stats.total_hours,
                    stats.completed_hours,
                    stats.total_count,
                    stats.completed_count
                ],
            )
            .await?;

        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM progress_snapshots \
                     WHERE project_id = ?1 ORDER BY id DESC LIMIT 1"
                ),
                [project_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(StoreError::NoResult)?;
        row_to_snapshot(&row)
    }

    /// All snapshots for a project, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on query failure.
    pub async fn snapshot_history(
        &self,
        project_id: i64,
    ) -> Result<Vec<ProgressSnapshot>, StoreError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM progress_snapshots \
                     WHERE project_id = ?1 ORDER BY created_at DESC, id DESC"
                ),
                [project_id],
            )
            .await?;

        let mut snapshots = Vec::new();
        while let Some(row) = rows.next().await? {
            snapshots.push(row_to_snapshot(&row)?);
        }
        Ok(snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::milestone::{MilestoneDraft, MilestoneUpdate};
    use crate::test_support::helpers::{test_project, test_service};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn stats_on_empty_project() {
        let svc = test_service().await;
        let project_id = test_project(&svc).await;

        let stats = svc.progress_stats(project_id).await.unwrap();
        assert_eq!(stats.since, None);
        assert_eq!(stats.total_count, 0);
        assert!((stats.ratio - 0.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn stats_weight_by_expected_hours() {
        let svc = test_service().await;
        let project_id = test_project(&svc).await;

        svc.create_milestone(
            project_id,
            MilestoneDraft {
                expected_hours: 30.0,
                status: Some("done".into()),
                ..MilestoneDraft::new("Finished")
            },
        )
        .await
        .unwrap();
        svc.create_milestone(
            project_id,
            MilestoneDraft {
                expected_hours: 10.0,
                ..MilestoneDraft::new("Open")
            },
        )
        .await
        .unwrap();

        let stats = svc.progress_stats(project_id).await.unwrap();
        assert_eq!(stats.total_count, 2);
        assert_eq!(stats.completed_count, 1);
        assert!((stats.total_hours - 40.0).abs() < f64::EPSILON);
        assert!((stats.completed_hours - 30.0).abs() < f64::EPSILON);
        assert!((stats.ratio - 0.75).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn stats_ratio_is_zero_without_hours() {
        let svc = test_service().await;
        let project_id = test_project(&svc).await;

        svc.create_milestone(
            project_id,
            MilestoneDraft {
                status: Some("done".into()),
                ..MilestoneDraft::new("A")
            },
        )
        .await
        .unwrap();
        svc.create_milestone(project_id, MilestoneDraft::new("B"))
            .await
            .unwrap();

        // Counts still accumulate, but the ratio is hour-weighted only.
        let stats = svc.progress_stats(project_id).await.unwrap();
        assert_eq!(stats.total_count, 2);
        assert_eq!(stats.completed_count, 1);
        assert!((stats.ratio - 0.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn snapshot_starts_new_period() {
        let svc = test_service().await;
        let project_id = test_project(&svc).await;

        let done = svc
            .create_milestone(
                project_id,
                MilestoneDraft {
                    status: Some("done".into()),
                    expected_hours: 8.0,
                    ..MilestoneDraft::new("Old work")
                },
            )
            .await
            .unwrap();
        svc.create_milestone(project_id, MilestoneDraft::new("Still open"))
            .await
            .unwrap();

        let snapshot = svc
            .record_snapshot(project_id, Some("sprint 1"))
            .await
            .unwrap();
        assert_eq!(snapshot.label, "sprint 1");
        assert_eq!(snapshot.completed_count, 1);

        // The completed milestone drops out of the next period's stats; the
        // open one stays.
        let stats = svc.progress_stats(project_id).await.unwrap();
        assert_eq!(stats.since, Some(snapshot.created_at));
        assert_eq!(stats.total_count, 1);
        assert_eq!(stats.completed_count, 0);

        // Completing the open milestone now counts in the new period.
        let open_slugs = svc.list_milestones(project_id, false, stats.since).await.unwrap();
        assert!(open_slugs.iter().all(|m| m.slug != done));
        svc.update_milestone(
            project_id,
            &open_slugs[0].slug,
            MilestoneUpdate {
                status: Some("done".into()),
                ..MilestoneUpdate::default()
            },
        )
        .await
        .unwrap();
        let stats = svc.progress_stats(project_id).await.unwrap();
        assert_eq!(stats.completed_count, 1);
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let svc = test_service().await;
        let project_id = test_project(&svc).await;

        svc.record_snapshot(project_id, Some("first")).await.unwrap();
        svc.record_snapshot(project_id, None).await.unwrap();

        let history = svc.snapshot_history(project_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].label.starts_with("Reset "));
        assert_eq!(history[1].label, "first");
    }

    #[tokio::test]
    async fn unlabeled_snapshot_gets_dated_reset_label() {
        let svc = test_service().await;
        let project_id = test_project(&svc).await;

        let snapshot = svc.record_snapshot(project_id, None).await.unwrap();
        let expected = format!("Reset {}", snapshot.created_at.format("%Y-%m-%d"));
        assert_eq!(snapshot.label, expected);
    }
}
