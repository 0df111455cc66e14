//! Authority levels and the policy provider interface.
//!
//! A principal's standing and a decision's override threshold are both
//! expressed as an [`AuthorityLevel`] in the closed range 1–4. Construction is
//! the only way to obtain a value, so a level held anywhere in the system is
//! known to be in range.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An out-of-range authority level was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("authority level {0} is outside the valid range {min}-{max}", min = AuthorityLevel::MIN.get(), max = AuthorityLevel::MAX.get())]
pub struct LevelOutOfRange(pub i64);

/// An integer authority level in `[1, 4]`. Higher can override lower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct AuthorityLevel(u8);

impl AuthorityLevel {
    /// Lowest authority; the default for unconfigured principals.
    pub const MIN: Self = Self(1);
    /// Highest authority.
    pub const MAX: Self = Self(4);

    /// Validate and wrap a raw level.
    ///
    /// # Errors
    ///
    /// Returns [`LevelOutOfRange`] if `value` is not in `[1, 4]`.
    pub const fn new(value: i64) -> Result<Self, LevelOutOfRange> {
        if value >= Self::MIN.0 as i64 && value <= Self::MAX.0 as i64 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Ok(Self(value as u8))
        } else {
            Err(LevelOutOfRange(value))
        }
    }

    /// The raw numeric level.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for AuthorityLevel {
    type Error = LevelOutOfRange;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AuthorityLevel> for i64 {
    fn from(level: AuthorityLevel) -> Self {
        Self::from(level.0)
    }
}

impl fmt::Display for AuthorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authority-policy configuration is malformed.
///
/// A misconfigured policy is a configuration fault and must be surfaced,
/// never silently defaulted or clamped.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A principal is configured with a level outside `[1, 4]`.
    #[error("configured authority level for '{principal}' is invalid: {source}")]
    InvalidLevel {
        principal: String,
        source: LevelOutOfRange,
    },
}

/// Resolves a principal's current authority level.
///
/// Implementations read external configuration state and perform no writes.
/// An unconfigured principal resolves to [`AuthorityLevel::MIN`].
pub trait AuthorityPolicy: Send + Sync {
    /// Look up the authority level for `principal`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] if the principal is configured with an invalid
    /// level.
    fn level_of(&self, principal: &str) -> Result<AuthorityLevel, PolicyError>;
}

/// A fixed in-memory policy table. Used by tests and as a fallback when no
/// configuration source is available.
#[derive(Debug, Clone, Default)]
pub struct StaticPolicy {
    levels: HashMap<String, i64>,
}

impl StaticPolicy {
    /// Build a policy from `(principal, level)` pairs. Levels are validated
    /// lazily on lookup, matching file-backed policy sources.
    #[must_use]
    pub fn new(levels: impl IntoIterator<Item = (String, i64)>) -> Self {
        Self {
            levels: levels.into_iter().collect(),
        }
    }
}

impl AuthorityPolicy for StaticPolicy {
    fn level_of(&self, principal: &str) -> Result<AuthorityLevel, PolicyError> {
        match self.levels.get(principal) {
            None => Ok(AuthorityLevel::MIN),
            Some(&raw) => AuthorityLevel::new(raw).map_err(|source| PolicyError::InvalidLevel {
                principal: principal.to_string(),
                source,
            }),
        }
    }
}
