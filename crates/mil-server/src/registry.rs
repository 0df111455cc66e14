//! Project registry — the dashboard's key-to-state-directory map.
//!
//! A small JSON file listing every project the dashboard knows about. Each
//! entry points at a state directory containing that project's `milstone.db`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Database filename inside every project state directory.
pub const DB_FILENAME: &str = "milstone.db";

/// Errors from registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A registration payload failed validation.
    #[error("{0}")]
    Invalid(String),

    /// Registry file I/O failed.
    #[error("registry file: {0}")]
    Io(#[from] std::io::Error),

    /// Registry file contains malformed JSON.
    #[error("registry file: {0}")]
    Serde(#[from] serde_json::Error),
}

/// One registered project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEntry {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// The project's working tree, for display.
    #[serde(default)]
    pub path: Option<String>,
    pub state_dir: PathBuf,
}

impl ProjectEntry {
    /// Path of the project's database file.
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.state_dir.join(DB_FILENAME)
    }
}

/// The registry: entries keyed by project key, optionally persisted to a
/// JSON file.
#[derive(Debug, Default)]
pub struct Registry {
    path: Option<PathBuf>,
    entries: BTreeMap<String, ProjectEntry>,
}

impl Registry {
    /// Load the registry from a JSON file. A missing file yields an empty
    /// registry that will be created on first save.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` if the file exists but cannot be read or
    /// parsed.
    pub fn load(path: PathBuf) -> Result<Self, RegistryError> {
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let list: Vec<ProjectEntry> = serde_json::from_str(&raw)?;
            list.into_iter().map(|e| (e.key.clone(), e)).collect()
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path: Some(path),
            entries,
        })
    }

    /// An unpersisted registry, for tests.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Validate and insert an entry, then persist.
    ///
    /// The state directory and its `milstone.db` must already exist;
    /// registration never creates project data.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Invalid` for a bad entry, or an I/O error
    /// from saving.
    pub fn register(&mut self, entry: ProjectEntry) -> Result<(), RegistryError> {
        if entry.key.trim().is_empty() {
            return Err(RegistryError::Invalid("missing projectKey".into()));
        }
        if !entry.state_dir.is_dir() {
            return Err(RegistryError::Invalid(format!(
                "stateDir does not exist: {}",
                entry.state_dir.display()
            )));
        }
        if !entry.db_path().is_file() {
            return Err(RegistryError::Invalid(format!(
                "{DB_FILENAME} not found in stateDir {}",
                entry.state_dir.display()
            )));
        }
        self.entries.insert(entry.key.clone(), entry);
        self.save()
    }

    /// Look up a project by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ProjectEntry> {
        self.entries.get(key)
    }

    /// All entries, ordered by key.
    #[must_use]
    pub fn entries(&self) -> Vec<ProjectEntry> {
        self.entries.values().cloned().collect()
    }

    fn save(&self) -> Result<(), RegistryError> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let list: Vec<&ProjectEntry> = self.entries.values().collect();
        fs::write(path, serde_json::to_vec_pretty(&list)?)?;
        Ok(())
    }
}

/// Default registry file location under the user data directory.
#[must_use]
pub fn default_registry_path(data_dir: &Path) -> PathBuf {
    data_dir.join("milstone").join("projects.json")
}
