//! # mil-config
//!
//! Layered configuration loading for Milstone using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`MILSTONE_*` prefix, `__` as separator)
//! 2. Project-level `.milstone/config.toml`
//! 3. User-level `~/.config/milstone/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `MILSTONE_SERVER__PORT` -> `server.port`,
//! `MILSTONE_AUTHORITY__LEVELS__ALICE` -> `authority.levels.alice`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use mil_config::MilConfig;
//!
//! let config = MilConfig::load(None).expect("config");
//! println!("dashboard port: {}", config.server.port);
//! ```

mod authority;
mod error;
mod general;
mod server;

pub use authority::AuthorityConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use server::ServerConfig;

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MilConfig {
    #[serde(default)]
    pub authority: AuthorityConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl MilConfig {
    /// Load configuration from all sources (TOML files + environment
    /// variables). `project_root` points at the directory containing
    /// `.milstone/`; pass `None` to use the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source fails to parse or extract.
    pub fn load(project_root: Option<&Path>) -> Result<Self, ConfigError> {
        Self::figment(project_root).extract().map_err(ConfigError::from)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can layer additional providers on top.
    #[must_use]
    pub fn figment(project_root: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = project_root
            .map_or_else(|| PathBuf::from(".milstone"), |root| root.join(".milstone"))
            .join("config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("MILSTONE_").split("__"))
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("milstone").join("config.toml"))
    }
}
