use mil_db::repos::log::{LogDraft, LogEdit};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::LogCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `milstone log`.
pub async fn handle(
    action: &LogCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        LogCommands::Add {
            slug,
            summary,
            author,
            status,
            progress,
        } => {
            let author = author.clone().or_else(|| {
                let configured = &ctx.config.general.default_author;
                if configured.is_empty() {
                    None
                } else {
                    Some(configured.clone())
                }
            });
            let log = ctx
                .service
                .add_log(
                    ctx.project.id,
                    slug,
                    LogDraft {
                        summary: summary.clone(),
                        author,
                        status: status.clone(),
                        progress: *progress,
                    },
                )
                .await?;
            output(&log, flags.format)
        }
        LogCommands::List { slug } => {
            let logs = ctx.service.list_logs(ctx.project.id, slug).await?;
            output(&logs, flags.format)
        }
        LogCommands::Edit {
            slug,
            sequence,
            summary,
            status,
            progress,
        } => {
            let log = ctx
                .service
                .edit_log(
                    ctx.project.id,
                    slug,
                    *sequence,
                    LogEdit {
                        summary: summary.clone(),
                        status: status.clone().map(Some),
                        progress: progress.map(Some),
                    },
                )
                .await?;
            output(&log, flags.format)
        }
    }
}
