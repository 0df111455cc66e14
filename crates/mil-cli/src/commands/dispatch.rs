use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Project { action } => commands::project::handle(&action, ctx, flags).await,
        Commands::Milestone { action } => commands::milestone::handle(&action, ctx, flags).await,
        Commands::Log { action } => commands::log::handle(&action, ctx, flags).await,
        Commands::Progress { action } => commands::progress::handle(&action, ctx, flags).await,
        Commands::Decision { action } => commands::decision::handle(&action, ctx, flags).await,
        Commands::Requests { action } => commands::request::handle(&action, ctx, flags).await,
        Commands::Serve(_) => {
            unreachable!("serve is pre-dispatched in main")
        }
    }
}
