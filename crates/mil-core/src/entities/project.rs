use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked project. Each project owns one database file under its state
/// directory; all other entities are scoped to exactly one project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: i64,
    /// Stable lookup key (slug of the project directory by default).
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}
