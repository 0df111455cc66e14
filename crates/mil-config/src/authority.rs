//! Authority policy configuration.
//!
//! The `[authority.levels]` table maps principal names to levels 1–4. Raw
//! integers are kept as written and validated on lookup, so a misconfigured
//! entry surfaces as a [`PolicyError`] the first time that principal acts,
//! rather than being clamped or silently defaulted at load time.

use std::collections::HashMap;

use mil_core::authority::{AuthorityLevel, AuthorityPolicy, PolicyError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthorityConfig {
    /// Principal name -> authority level (1–4).
    #[serde(default)]
    pub levels: HashMap<String, i64>,
}

impl AuthorityPolicy for AuthorityConfig {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_principal_defaults_to_lowest() {
        let config = AuthorityConfig::default();
        assert_eq!(config.level_of("carol").unwrap(), AuthorityLevel::MIN);
    }

    #[test]
    fn configured_principal_resolves() {
        let config = AuthorityConfig {
            levels: HashMap::from([("alice".to_string(), 4)]),
        };
        assert_eq!(config.level_of("alice").unwrap().get(), 4);
    }

    #[test]
    fn out_of_range_level_is_a_policy_error() {
        let config = AuthorityConfig {
            levels: HashMap::from([("mallory".to_string(), 0)]),
        };
        assert!(matches!(
            config.level_of("mallory"),
            Err(PolicyError::InvalidLevel { .. })
        ));
    }
}
