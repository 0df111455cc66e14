//! Parsing and limiting helpers shared by command handlers.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use mil_core::enums::{DecisionStatus, RequestStatus};
use mil_db::helpers::parse_flexible_datetime;

use crate::cli::GlobalFlags;
use crate::context::AppContext;

pub fn parse_decision_status(value: &str) -> anyhow::Result<DecisionStatus> {
    DecisionStatus::from_input(value).ok_or_else(|| anyhow!("unknown decision status '{value}'"))
}

pub fn parse_request_status(value: &str) -> anyhow::Result<RequestStatus> {
    RequestStatus::from_input(value).ok_or_else(|| anyhow!("unknown request status '{value}'"))
}

/// Parse a `--from`/`--to` style date flag (RFC 3339 or `YYYY-MM-DD`).
pub fn parse_date(value: &str, flag: &str) -> anyhow::Result<DateTime<Utc>> {
    parse_flexible_datetime(value).ok_or_else(|| anyhow!("invalid --{flag} date '{value}'"))
}

/// Truncate list output to `--limit`, falling back to the configured default.
pub fn apply_limit<T>(mut items: Vec<T>, ctx: &AppContext, flags: &GlobalFlags) -> Vec<T> {
    let limit = flags.limit.unwrap_or(ctx.config.general.default_limit) as usize;
    if limit > 0 {
        items.truncate(limit);
    }
    items
}
