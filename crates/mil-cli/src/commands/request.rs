use crate::cli::GlobalFlags;
use crate::cli::subcommands::RequestCommands;
use crate::commands::shared::{apply_limit, parse_request_status};
use crate::context::AppContext;
use crate::output::output;

/// Handle `milstone requests`.
pub async fn handle(
    action: &RequestCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        RequestCommands::List { status, decision } => {
            let status = status.as_deref().map(parse_request_status).transpose()?;
            let requests = ctx
                .service
                .list_override_requests(ctx.project.id, status, *decision)
                .await?;
            output(&apply_limit(requests, ctx, flags), flags.format)
        }
    }
}
