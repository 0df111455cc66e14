use crate::cli::GlobalFlags;
use crate::cli::subcommands::ProgressCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `milstone progress`.
pub async fn handle(
    action: &ProgressCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ProgressCommands::Show => {
            let stats = ctx.service.progress_stats(ctx.project.id).await?;
            output(&stats, flags.format)
        }
        ProgressCommands::Reset { label } => {
            let snapshot = ctx
                .service
                .record_snapshot(ctx.project.id, label.as_deref())
                .await?;
            output(&snapshot, flags.format)
        }
        ProgressCommands::History => {
            let history = ctx.service.snapshot_history(ctx.project.id).await?;
            output(&history, flags.format)
        }
    }
}
