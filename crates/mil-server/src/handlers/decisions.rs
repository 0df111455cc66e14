//! Decision, override, and override-request endpoints.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use mil_core::entities::{Decision, DecisionDetail, DecisionSummary};
use mil_core::enums::DecisionStatus;
use mil_core::responses::{DecisionCreateResponse, OkResponse};
use mil_db::helpers::parse_flexible_datetime;
use mil_db::repos::decision::{DecisionDraft, DecisionFilter};
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;
use crate::handlers::require_param;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub(crate) struct CreatePayload {
    title: String,
    decision: String,
    required_level: Option<i64>,
    maker: String,
    status: Option<String>,
    context: Option<String>,
    alternatives: Option<String>,
    consequences: Option<String>,
    tags: Option<String>,
    #[serde(rename = "milestoneSlug")]
    milestone_slug: Option<String>,
    relation_type: Option<String>,
    note: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub(crate) struct LinkPayload {
    #[serde(alias = "decisionId")]
    decision_id: Option<i64>,
    #[serde(rename = "milestoneSlug")]
    milestone_slug: Option<String>,
    relation_type: Option<String>,
    note: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub(crate) struct OverridePayload {
    decision_id: Option<i64>,
    overrides: Vec<i64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub(crate) struct OverrideRequestPayload {
    target_decision_id: Option<i64>,
    message: String,
    requester: String,
    proposed_summary: Option<String>,
}

/// `POST /api/decisions/create?projectKey=KEY`.
pub(crate) async fn create(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    Json(payload): Json<CreatePayload>,
) -> Result<Json<DecisionCreateResponse>, ApiError> {
    let key = require_param(&params, "projectKey")?;
    let required_level = payload
        .required_level
        .ok_or_else(|| ApiError::bad_request("Missing required_level"))?;
    let (svc, project) = state.open_project(key).await?;

    let decision_id = svc
        .create_decision(
            project.id,
            DecisionDraft {
                title: payload.title,
                decision_text: payload.decision,
                required_level,
                maker: payload.maker,
                status: payload.status,
                context: payload.context,
                alternatives: payload.alternatives,
                consequences: payload.consequences,
                tags: payload.tags,
                milestone_slug: payload.milestone_slug,
                relation_type: payload.relation_type,
                note: payload.note,
            },
        )
        .await?;
    Ok(Json(DecisionCreateResponse::new(decision_id)))
}

/// `GET /api/decisions?project=KEY&...` — filtered summaries in creation
/// order.
pub(crate) async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<DecisionSummary>>, ApiError> {
    let key = require_param(&params, "project")?;
    let filter = filter_from_params(&params)?;
    let (svc, project) = state.open_project(key).await?;
    Ok(Json(svc.list_decisions(project.id, &filter).await?))
}

/// `GET /api/decisions/active?project=KEY` — the active-decision view.
pub(crate) async fn active(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Decision>>, ApiError> {
    let key = require_param(&params, "project")?;
    let (svc, project) = state.open_project(key).await?;
    Ok(Json(svc.list_active_decisions(project.id).await?))
}

/// `GET /api/decisions/{id}?project=KEY` — full detail.
pub(crate) async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<DecisionDetail>, ApiError> {
    let key = require_param(&params, "project")?;
    let (svc, project) = state.open_project(key).await?;
    Ok(Json(svc.get_decision(project.id, id).await?))
}

/// `POST /api/decisions/link?projectKey=KEY`.
pub(crate) async fn link(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    Json(payload): Json<LinkPayload>,
) -> Result<Json<OkResponse>, ApiError> {
    let key = require_param(&params, "projectKey")?;
    let decision_id = payload
        .decision_id
        .ok_or_else(|| ApiError::bad_request("Missing decision_id"))?;
    let slug = payload
        .milestone_slug
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing milestoneSlug"))?;
    let (svc, project) = state.open_project(key).await?;

    svc.link_decision(
        project.id,
        decision_id,
        slug,
        payload.relation_type.as_deref(),
        payload.note.as_deref(),
    )
    .await?;
    Ok(Json(OkResponse::default()))
}

/// `POST /api/decisions/override?projectKey=KEY` — gated, atomic batch.
pub(crate) async fn override_targets(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    Json(payload): Json<OverridePayload>,
) -> Result<Json<OkResponse>, ApiError> {
    let key = require_param(&params, "projectKey")?;
    let decision_id = payload
        .decision_id
        .ok_or_else(|| ApiError::bad_request("Missing decision_id"))?;
    if payload.overrides.is_empty() {
        return Err(ApiError::bad_request("Missing overrides"));
    }
    let (svc, project) = state.open_project(key).await?;

    svc.override_decisions(project.id, decision_id, &payload.overrides)
        .await?;
    Ok(Json(OkResponse::default()))
}

/// `POST /api/decisions/override-request?projectKey=KEY`.
pub(crate) async fn override_request(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    Json(payload): Json<OverrideRequestPayload>,
) -> Result<Json<OkResponse>, ApiError> {
    let key = require_param(&params, "projectKey")?;
    let decision_id = payload
        .target_decision_id
        .ok_or_else(|| ApiError::bad_request("Missing target_decision_id"))?;
    let (svc, project) = state.open_project(key).await?;

    svc.request_override(
        project.id,
        decision_id,
        &payload.requester,
        &payload.message,
        payload.proposed_summary.as_deref(),
    )
    .await?;
    Ok(Json(OkResponse::default()))
}

fn filter_from_params(params: &HashMap<String, String>) -> Result<DecisionFilter, ApiError> {
    let mut filter = DecisionFilter::default();

    if let Some(raw) = params.get("status").filter(|v| !v.is_empty()) {
        for part in raw.split(',') {
            let status = DecisionStatus::from_input(part).ok_or_else(|| {
                ApiError::bad_request(format!("unknown decision status '{part}'"))
            })?;
            filter.status.push(status);
        }
    }
    if let Some(raw) = params.get("required_level").filter(|v| !v.is_empty()) {
        let level = raw
            .parse::<i64>()
            .map_err(|_| ApiError::bad_request(format!("invalid required_level '{raw}'")))?;
        filter.required_level = Some(level);
    }
    filter.maker = params.get("maker").filter(|v| !v.is_empty()).cloned();
    filter.milestone_slug = params.get("milestone").filter(|v| !v.is_empty()).cloned();
    filter.search = params.get("search").filter(|v| !v.is_empty()).cloned();
    filter.tag = params.get("tag").filter(|v| !v.is_empty()).cloned();

    if let Some(raw) = params.get("from").filter(|v| !v.is_empty()) {
        filter.created_from = Some(
            parse_flexible_datetime(raw)
                .ok_or_else(|| ApiError::bad_request(format!("invalid 'from' date '{raw}'")))?,
        );
    }
    if let Some(raw) = params.get("to").filter(|v| !v.is_empty()) {
        filter.created_to = Some(
            parse_flexible_datetime(raw)
                .ok_or_else(|| ApiError::bad_request(format!("invalid 'to' date '{raw}'")))?,
        );
    }
    Ok(filter)
}
