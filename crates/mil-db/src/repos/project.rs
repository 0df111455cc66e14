//! Project repository — registration, lookup, data reset.

use chrono::Utc;

use mil_core::entities::Project;

use crate::error::StoreError;
use crate::helpers::{get_opt_string, parse_datetime};
use crate::service::MilService;

const SELECT_COLS: &str = "id, key, name, description, created_at";

fn row_to_project(row: &libsql::Row) -> Result<Project, StoreError> {
    Ok(Project {
        id: row.get(0)?,
        key: row.get(1)?,
        name: row.get(2)?,
        description: get_opt_string(row, 3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

impl MilService {
    /// Fetch the project with the given key, creating it if absent.
    ///
    /// On an existing project, `name` and `description` refresh the stored
    /// values when supplied; on creation, `name` defaults to the key.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on query failure.
    pub async fn ensure_project(
        &self,
        key: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Project, StoreError> {
        if key.trim().is_empty() {
            return Err(StoreError::Validation("project key must not be empty".into()));
        }

        if let Some(existing) = self.find_project(key).await? {
            if name.is_some() || description.is_some() {
                self.db()
                    .conn()
                    .execute(
                        "UPDATE projects SET name = COALESCE(?1, name), description = COALESCE(?2, description) WHERE id = ?3",
                        libsql::params![name, description, existing.id],
                    )
                    .await?;
                return self.get_project(key).await;
            }
            return Ok(existing);
        }

        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "INSERT INTO projects (key, name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
                libsql::params![key, name.unwrap_or(key), description, now.to_rfc3339()],
            )
            .await?;
        self.get_project(key).await
    }

    /// Fetch a project by key, or `None` if it is not registered.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on query failure.
    pub async fn find_project(&self, key: &str) -> Result<Option<Project>, StoreError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM projects WHERE key = ?1"),
                [key],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_project(&row)?)),
            None => Ok(None),
        }
    }

    /// Fetch a project by key.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the key is not registered.
    pub async fn get_project(&self, key: &str) -> Result<Project, StoreError> {
        self.find_project(key)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("project '{key}'")))
    }

    /// Delete all data owned by a project, keeping the project row itself.
    ///
    /// Children are removed in dependency order inside one transaction so a
    /// failure leaves the project untouched.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on query failure.
    pub async fn reset_project(&self, project_id: i64) -> Result<(), StoreError> {
        let tx = self.db().conn().transaction().await?;

        // Referential order: requests, then edges, then links, before the
        // decisions they point at; milestone children before milestones.
        tx.execute(
            "DELETE FROM override_requests WHERE project_id = ?1",
            [project_id],
        )
        .await?;
        tx.execute(
            "DELETE FROM decision_overrides WHERE overriding_id IN
                 (SELECT id FROM decisions WHERE project_id = ?1)",
            [project_id],
        )
        .await?;
        tx.execute(
            "DELETE FROM milestone_decisions WHERE milestone_id IN
                 (SELECT id FROM milestones WHERE project_id = ?1)",
            [project_id],
        )
        .await?;
        tx.execute("DELETE FROM decisions WHERE project_id = ?1", [project_id])
            .await?;
        tx.execute(
            "DELETE FROM milestone_updates WHERE milestone_id IN
                 (SELECT id FROM milestones WHERE project_id = ?1)",
            [project_id],
        )
        .await?;
        tx.execute(
            "DELETE FROM progress_snapshots WHERE project_id = ?1",
            [project_id],
        )
        .await?;
        tx.execute("DELETE FROM milestones WHERE project_id = ?1", [project_id])
            .await?;

        tx.commit().await?;
        tracing::info!(project_id, "cleared all project data");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;

    #[tokio::test]
    async fn ensure_project_creates_then_returns_existing() {
        let svc = test_service().await;

        let created = svc
            .ensure_project("proj-1", Some("My Project"), Some("demo"))
            .await
            .unwrap();
        assert_eq!(created.key, "proj-1");
        assert_eq!(created.name, "My Project");
        assert_eq!(created.description.as_deref(), Some("demo"));

        let again = svc.ensure_project("proj-1", None, None).await.unwrap();
        assert_eq!(again.id, created.id);
        assert_eq!(again.name, "My Project");
    }

    #[tokio::test]
    async fn ensure_project_defaults_name_to_key() {
        let svc = test_service().await;
        let project = svc.ensure_project("bare", None, None).await.unwrap();
        assert_eq!(project.name, "bare");
        assert_eq!(project.description, None);
    }

    #[tokio::test]
    async fn ensure_project_rejects_empty_key() {
        let svc = test_service().await;
        let result = svc.ensure_project("  ", None, None).await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[tokio::test]
    async fn get_project_missing_is_not_found() {
        let svc = test_service().await;
        let result = svc.get_project("ghost").await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn reset_project_clears_children() {
        let svc = test_service().await;
        let project = svc.ensure_project("p", None, None).await.unwrap();

        let slug = svc
            .create_milestone(project.id, crate::repos::milestone::MilestoneDraft::new("Ship v1"))
            .await
            .unwrap();
        svc.reset_project(project.id).await.unwrap();

        let milestones = svc.list_milestones(project.id, false, None).await.unwrap();
        assert!(milestones.is_empty());
        assert!(svc.get_milestone(project.id, &slug).await.is_err());
        // Project row survives.
        assert!(svc.find_project("p").await.unwrap().is_some());
    }
}
