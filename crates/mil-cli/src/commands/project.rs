use std::path::Path;

use anyhow::Context;
use mil_config::MilConfig;
use mil_core::entities::{ProgressStats, Project};
use mil_core::responses::OkResponse;
use mil_db::service::MilService;
use mil_server::registry::{ProjectEntry, Registry, default_registry_path};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ProjectCommands;
use crate::context::{self, AppContext, STATE_DIR};
use crate::output::output;

/// Handle `milstone project` (show and reset; init is pre-dispatched).
pub async fn handle(
    action: &ProjectCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ProjectCommands::Init { .. } => unreachable!("init is pre-dispatched in main"),
        ProjectCommands::Show => show(ctx, flags).await,
        ProjectCommands::Reset => reset(ctx, flags).await,
    }
}

/// Handle `milstone project init`: create the state directory and database,
/// then register the project with the dashboard.
pub async fn init(
    root: &Path,
    key: Option<&str>,
    name: Option<&str>,
    description: Option<&str>,
    config: &MilConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let state_dir = root.join(STATE_DIR);
    std::fs::create_dir_all(&state_dir)
        .with_context(|| format!("failed to create {}", state_dir.display()))?;

    let default_key = context::project_key(root);
    let key = key.unwrap_or(&default_key);
    let default_name = root.file_name().and_then(|n| n.to_str());

    let db_path = state_dir.join(mil_server::registry::DB_FILENAME);
    let service = MilService::open_local(
        &db_path.to_string_lossy(),
        Box::new(config.authority.clone()),
    )
    .await?;
    let project = service
        .ensure_project(key, name.or(default_name), description)
        .await?;

    register_with_dashboard(&project, root, state_dir)?;

    output(&project, flags.format)
}

fn register_with_dashboard(
    project: &Project,
    root: &Path,
    state_dir: std::path::PathBuf,
) -> anyhow::Result<()> {
    let Some(data_dir) = dirs::data_dir() else {
        tracing::warn!("no user data directory; skipping dashboard registration");
        return Ok(());
    };

    let mut registry = Registry::load(default_registry_path(&data_dir))?;
    registry.register(ProjectEntry {
        key: project.key.clone(),
        name: project.name.clone(),
        description: project.description.clone(),
        path: Some(root.display().to_string()),
        state_dir,
    })?;
    Ok(())
}

#[derive(Serialize)]
struct ProjectShow {
    #[serde(flatten)]
    project: Project,
    progress: ProgressStats,
}

async fn show(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let progress = ctx.service.progress_stats(ctx.project.id).await?;
    output(
        &ProjectShow {
            project: ctx.project.clone(),
            progress,
        },
        flags.format,
    )
}

async fn reset(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.service.reset_project(ctx.project.id).await?;
    output(&OkResponse::default(), flags.format)
}
