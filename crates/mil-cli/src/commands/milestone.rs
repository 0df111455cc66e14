use mil_core::responses::OkResponse;
use mil_db::repos::milestone::{MilestoneDraft, MilestoneUpdate};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::MilestoneCommands;
use crate::commands::shared::apply_limit;
use crate::context::AppContext;
use crate::output::output;

/// Handle `milstone milestone`.
pub async fn handle(
    action: &MilestoneCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        MilestoneCommands::Create {
            title,
            description,
            status,
            priority,
            owner,
            start_date,
            due,
            parent,
            expected_hours,
        } => {
            let slug = ctx
                .service
                .create_milestone(
                    ctx.project.id,
                    MilestoneDraft {
                        title: title.clone(),
                        description: description.clone(),
                        status: status.clone(),
                        priority: priority.unwrap_or(3),
                        owner: owner.clone(),
                        start_date: start_date.clone(),
                        due_date: due.clone(),
                        parent_slug: parent.clone(),
                        expected_hours: expected_hours.unwrap_or(1.0),
                    },
                )
                .await?;
            let milestone = ctx.service.get_milestone(ctx.project.id, &slug).await?;
            output(&milestone, flags.format)
        }
        MilestoneCommands::Update {
            slug,
            title,
            description,
            status,
            priority,
            owner,
            start_date,
            due,
            parent,
            clear_parent,
            expected_hours,
        } => {
            let parent_slug = if *clear_parent {
                Some(None)
            } else {
                parent.clone().map(Some)
            };
            let milestone = ctx
                .service
                .update_milestone(
                    ctx.project.id,
                    slug,
                    MilestoneUpdate {
                        title: title.clone(),
                        description: description.clone().map(Some),
                        status: status.clone(),
                        priority: *priority,
                        owner: owner.clone().map(Some),
                        start_date: start_date.clone().map(Some),
                        due_date: due.clone().map(Some),
                        parent_slug,
                        expected_hours: *expected_hours,
                    },
                )
                .await?;
            output(&milestone, flags.format)
        }
        MilestoneCommands::List { all } => {
            let since = ctx.service.current_period_start(ctx.project.id).await?;
            let milestones = ctx
                .service
                .list_milestones(ctx.project.id, *all, since)
                .await?;
            output(&apply_limit(milestones, ctx, flags), flags.format)
        }
        MilestoneCommands::Delete { slug } => {
            ctx.service.delete_milestone(ctx.project.id, slug).await?;
            output(&OkResponse::default(), flags.format)
        }
    }
}
