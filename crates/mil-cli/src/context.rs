//! Application context: resolved project root, config, and an open service.

use std::path::{Path, PathBuf};

use anyhow::Context;
use mil_config::MilConfig;
use mil_core::entities::Project;
use mil_db::repos::milestone::slugify;
use mil_db::service::MilService;
use mil_server::registry::DB_FILENAME;

/// State directory name inside a project root.
pub const STATE_DIR: &str = ".milstone";

/// Everything a command handler needs: the open database service and the
/// project row it operates on.
pub struct AppContext {
    pub project_root: PathBuf,
    pub config: MilConfig,
    pub service: MilService,
    pub project: Project,
}

impl AppContext {
    /// Open the project database under `root/.milstone/` and load the
    /// project row. The database must already exist.
    pub async fn init(root: PathBuf, config: MilConfig) -> anyhow::Result<Self> {
        let db_path = root.join(STATE_DIR).join(DB_FILENAME);
        if !db_path.is_file() {
            anyhow::bail!(
                "no database at {}. Run 'milstone project init' first.",
                db_path.display()
            );
        }

        let service = MilService::open_local(
            &db_path.to_string_lossy(),
            Box::new(config.authority.clone()),
        )
        .await?;

        let key = project_key(&root);
        let project = service
            .ensure_project(&key, None, None)
            .await
            .with_context(|| format!("failed to load project '{key}'"))?;

        Ok(Self {
            project_root: root,
            config,
            service,
            project,
        })
    }
}

/// Default project key: the root directory name, slugified.
#[must_use]
pub fn project_key(root: &Path) -> String {
    let name = root
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("project");
    slugify(name)
}

/// Walk up from `start` looking for a directory containing `.milstone/`.
#[must_use]
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(STATE_DIR).is_dir() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_key_slugifies_directory_name() {
        assert_eq!(project_key(Path::new("/home/dev/My Project")), "my-project");
    }

    #[test]
    fn find_project_root_walks_up() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("repo");
        let nested = root.join("src").join("deep");
        std::fs::create_dir_all(root.join(STATE_DIR)).unwrap();
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_project_root(&nested), Some(root));
        assert_eq!(find_project_root(tmp.path()), None);
    }
}
