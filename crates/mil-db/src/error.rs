//! Storage error taxonomy for mil-db.

use mil_core::authority::PolicyError;
use thiserror::Error;

/// Errors from storage operations.
///
/// The first six variants are the domain taxonomy surfaced to callers (CLI
/// exit codes, HTTP status mapping); the rest are infrastructure failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Input is malformed or violates a range/shape constraint.
    #[error("validation: {0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The authority gate rejected an override.
    #[error(
        "authority: maker level {maker_level} does not exceed required level {required_level} of decision {decision_id}"
    )]
    Authority {
        decision_id: i64,
        maker_level: u8,
        required_level: u8,
    },

    /// Adding the override edge would make the graph cyclic.
    #[error("cycle: decision {target_id} already transitively overrides decision {overriding_id}")]
    Cycle { overriding_id: i64, target_id: i64 },

    /// A uniqueness constraint was violated.
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// The authority policy itself is misconfigured.
    #[error("policy: {0}")]
    Policy(#[from] PolicyError),

    /// An entity is in a state that forbids the operation.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A SQL query failed.
    #[error("query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("no result returned")]
    NoResult,

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<libsql::Error> for StoreError {
    fn from(err: libsql::Error) -> Self {
        // SQLite reports uniqueness violations as constraint failures; map
        // them onto the domain taxonomy so callers see `Duplicate`.
        let msg = err.to_string();
        if msg.contains("UNIQUE constraint failed") {
            Self::Duplicate(msg)
        } else {
            Self::LibSql(err)
        }
    }
}
