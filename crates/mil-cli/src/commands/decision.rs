use anyhow::bail;
use mil_db::repos::decision::{DecisionDraft, DecisionFilter};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::DecisionCommands;
use crate::commands::shared::{apply_limit, parse_date, parse_decision_status};
use crate::context::AppContext;
use crate::output::output;

/// Handle `milstone decision`.
pub async fn handle(
    action: &DecisionCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        DecisionCommands::Create {
            title,
            decision,
            level,
            maker,
            status,
            context,
            alternatives,
            consequences,
            tags,
            milestone,
            relation,
            note,
        } => {
            let id = ctx
                .service
                .create_decision(
                    ctx.project.id,
                    DecisionDraft {
                        title: title.clone(),
                        decision_text: decision.clone(),
                        required_level: *level,
                        maker: maker.clone(),
                        status: status.clone(),
                        context: context.clone(),
                        alternatives: alternatives.clone(),
                        consequences: consequences.clone(),
                        tags: tags.clone(),
                        milestone_slug: milestone.clone(),
                        relation_type: relation.clone(),
                        note: note.clone(),
                    },
                )
                .await?;
            let record = ctx.service.get_decision_record(ctx.project.id, id).await?;
            output(&record, flags.format)
        }
        DecisionCommands::Get { id } => {
            let detail = ctx.service.get_decision(ctx.project.id, *id).await?;
            output(&detail, flags.format)
        }
        DecisionCommands::List {
            status,
            level,
            maker,
            milestone,
            search,
            tag,
            from,
            to,
        } => {
            let status = match status.as_deref() {
                Some(raw) => raw
                    .split(',')
                    .map(parse_decision_status)
                    .collect::<anyhow::Result<Vec<_>>>()?,
                None => Vec::new(),
            };
            let filter = DecisionFilter {
                status,
                required_level: *level,
                maker: maker.clone(),
                milestone_slug: milestone.clone(),
                search: search.clone(),
                tag: tag.clone(),
                created_from: from.as_deref().map(|v| parse_date(v, "from")).transpose()?,
                created_to: to.as_deref().map(|v| parse_date(v, "to")).transpose()?,
            };
            let decisions = ctx.service.list_decisions(ctx.project.id, &filter).await?;
            output(&apply_limit(decisions, ctx, flags), flags.format)
        }
        DecisionCommands::Active => {
            let active = ctx.service.list_active_decisions(ctx.project.id).await?;
            output(&active, flags.format)
        }
        DecisionCommands::Override { id, overrides } => {
            ctx.service
                .override_decisions(ctx.project.id, *id, overrides)
                .await?;
            let detail = ctx.service.get_decision(ctx.project.id, *id).await?;
            output(&detail, flags.format)
        }
        DecisionCommands::Request {
            id,
            requester,
            message,
            summary,
        } => {
            let request = ctx
                .service
                .request_override(ctx.project.id, *id, requester, message, summary.as_deref())
                .await?;
            output(&request, flags.format)
        }
        DecisionCommands::Resolve {
            request_id,
            reviewer,
            approve,
            reject,
        } => {
            if !approve && !reject {
                bail!("pass --approve or --reject");
            }
            let request = ctx
                .service
                .resolve_override_request(ctx.project.id, *request_id, *approve, reviewer)
                .await?;
            output(&request, flags.format)
        }
        DecisionCommands::Link {
            id,
            milestone,
            relation,
            note,
        } => {
            let link = ctx
                .service
                .link_decision(
                    ctx.project.id,
                    *id,
                    milestone,
                    relation.as_deref(),
                    note.as_deref(),
                )
                .await?;
            output(&link, flags.format)
        }
        DecisionCommands::Status { id, status } => {
            let status = parse_decision_status(status)?;
            let decision = ctx
                .service
                .update_decision_status(ctx.project.id, *id, status)
                .await?;
            output(&decision, flags.format)
        }
    }
}
