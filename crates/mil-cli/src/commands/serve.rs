use anyhow::Context;
use mil_config::MilConfig;
use mil_server::AppState;
use mil_server::registry::{Registry, default_registry_path};

use crate::cli::subcommands::ServeArgs;

/// Handle `milstone serve`: run the dashboard HTTP service in the foreground
/// over all registered projects.
pub async fn handle(args: &ServeArgs, config: &MilConfig) -> anyhow::Result<()> {
    let data_dir = dirs::data_dir().context("no user data directory for the project registry")?;
    let registry = Registry::load(default_registry_path(&data_dir))?;

    let host = args.host.clone().unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    let state = AppState::new(registry, config.authority.clone());
    mil_server::run(state, &addr).await
}
