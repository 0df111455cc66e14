//! Shared helpers for repo tests.

pub(crate) mod helpers {
    use mil_core::authority::StaticPolicy;

    use crate::MilDb;
    use crate::service::MilService;

    /// In-memory service with a standard policy table:
    /// alice = 4, dana = 3, bob = 2; everyone else defaults to 1.
    pub async fn test_service() -> MilService {
        let levels = [
            ("alice".to_string(), 4),
            ("dana".to_string(), 3),
            ("bob".to_string(), 2),
        ];
        test_service_with_policy(levels).await
    }

    /// In-memory service with an explicit `(principal, level)` table.
    pub async fn test_service_with_policy(
        levels: impl IntoIterator<Item = (String, i64)>,
    ) -> MilService {
        let db = MilDb::open_local(":memory:").await.unwrap();
        MilService::from_db(db, Box::new(StaticPolicy::new(levels)))
    }

    /// Create a project and return its id.
    pub async fn test_project(svc: &MilService) -> i64 {
        svc.ensure_project("test-key", Some("Test Project"), None)
            .await
            .unwrap()
            .id
    }
}
