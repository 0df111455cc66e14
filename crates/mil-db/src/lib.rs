//! # mil-db
//!
//! libSQL storage for Milstone project state.
//!
//! Handles all relational state: projects, milestones, progress logs and
//! snapshots, decisions, the override graph, override requests, and
//! milestone-decision links. Each project keeps its own database file under
//! its state directory; tests use `":memory:"`.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;

use error::StoreError;
use libsql::Builder;

/// Database handle for one Milstone state file.
pub struct MilDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl MilDb {
    /// Open a local database at the given path, running migrations.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the database cannot be opened or migrations
    /// fail.
    pub async fn open_local(path: &str) -> Result<Self, StoreError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Foreign keys are off by default and per-connection in SQLite.
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| StoreError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let mil_db = Self { db, conn };
        mil_db.run_migrations().await?;
        tracing::debug!(path, "opened milstone database");
        Ok(mil_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> MilDb {
        MilDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = [
            "projects",
            "milestones",
            "milestone_updates",
            "progress_snapshots",
            "decisions",
            "decision_overrides",
            "override_requests",
            "milestone_decisions",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [*table],
                )
                .await
                .unwrap();
            assert!(
                rows.next().await.unwrap().is_some(),
                "missing table: {table}"
            );
        }
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn decision_level_check_constraint() {
        let db = test_db().await;
        db.conn()
            .execute(
                "INSERT INTO projects (key, name, created_at) VALUES ('k', 'n', '2026-01-01T00:00:00+00:00')",
                (),
            )
            .await
            .unwrap();

        let result = db
            .conn()
            .execute(
                "INSERT INTO decisions (project_id, title, decision_text, required_level, maker, maker_level, created_at, updated_at)
                 VALUES (1, 't', 'd', 9, 'alice', 2, '2026-01-01T00:00:00+00:00', '2026-01-01T00:00:00+00:00')",
                (),
            )
            .await;
        assert!(result.is_err(), "CHECK should reject required_level 9");
    }

    #[tokio::test]
    async fn override_self_edge_rejected_by_check() {
        let db = test_db().await;
        db.conn()
            .execute(
                "INSERT INTO projects (key, name, created_at) VALUES ('k', 'n', '2026-01-01T00:00:00+00:00')",
                (),
            )
            .await
            .unwrap();
        db.conn()
            .execute(
                "INSERT INTO decisions (project_id, title, decision_text, required_level, maker, maker_level, created_at, updated_at)
                 VALUES (1, 't', 'd', 2, 'alice', 3, '2026-01-01T00:00:00+00:00', '2026-01-01T00:00:00+00:00')",
                (),
            )
            .await
            .unwrap();

        let result = db
            .conn()
            .execute(
                "INSERT INTO decision_overrides (overriding_id, overridden_id, created_at)
                 VALUES (1, 1, '2026-01-01T00:00:00+00:00')",
                (),
            )
            .await;
        assert!(result.is_err(), "CHECK should reject self-override");
    }
}
