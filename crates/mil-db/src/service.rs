//! Service layer binding storage to the authority policy.
//!
//! `MilService` wraps `MilDb` (raw database access) and an injected
//! [`AuthorityPolicy`] used to snapshot maker and requester levels at write
//! time. All repo methods are implemented as `impl MilService`.

use mil_core::authority::AuthorityPolicy;

use crate::MilDb;
use crate::error::StoreError;

/// Orchestrates storage mutations against one project database.
///
/// The policy is consulted only when a principal's level is snapshotted
/// (decision creation, override requests); stored levels are never
/// re-derived afterwards.
pub struct MilService {
    db: MilDb,
    policy: Box<dyn AuthorityPolicy>,
}

impl MilService {
    /// Open a service over a local database file.
    ///
    /// # Arguments
    ///
    /// * `db_path` — Path to the libSQL database file, or `":memory:"` for
    ///   tests.
    /// * `policy` — Authority level source for principals.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the database cannot be opened.
    pub async fn open_local(
        db_path: &str,
        policy: Box<dyn AuthorityPolicy>,
    ) -> Result<Self, StoreError> {
        let db = MilDb::open_local(db_path).await?;
        Ok(Self { db, policy })
    }

    /// Create from an existing `MilDb` (for testing).
    #[must_use]
    pub fn from_db(db: MilDb, policy: Box<dyn AuthorityPolicy>) -> Self {
        Self { db, policy }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &MilDb {
        &self.db
    }

    /// Access the authority policy.
    pub fn policy(&self) -> &dyn AuthorityPolicy {
        self.policy.as_ref()
    }
}
