//! Milestone and log endpoints.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Query, State};
use mil_core::responses::{LogResponse, MilestoneCreateResponse, MilestonesResponse, OkResponse};
use mil_db::repos::log::{LogDraft, LogEdit};
use mil_db::repos::milestone::{MilestoneDraft, MilestoneUpdate};
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;
use crate::handlers::require_param;

const fn default_priority() -> i64 {
    3
}

const fn default_expected_hours() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatePayload {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default = "default_priority")]
    priority: i64,
    #[serde(default)]
    owner: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(default)]
    parent_slug: Option<String>,
    #[serde(default = "default_expected_hours")]
    expected_hours: f64,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct UpdatePayload {
    slug: String,
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
    priority: Option<i64>,
    owner: Option<String>,
    start_date: Option<String>,
    due_date: Option<String>,
    parent_slug: Option<String>,
    clear_parent: bool,
    expected_hours: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct DeletePayload {
    slug: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct CreateLogPayload {
    slug: String,
    summary: String,
    author: Option<String>,
    status: Option<String>,
    progress: Option<i64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct UpdateLogPayload {
    slug: String,
    sequence: Option<i64>,
    summary: Option<String>,
    status: Option<String>,
    progress: Option<i64>,
}

/// `GET /api/milestones?project=KEY&include_deleted=true|false`.
pub(crate) async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<MilestonesResponse>, ApiError> {
    let key = require_param(&params, "project")?;
    let include_deleted = params.get("include_deleted").is_some_and(|v| v == "true");

    let (svc, project) = state.open_project(key).await?;
    let since = svc.current_period_start(project.id).await?;
    let milestones = svc
        .list_milestones(project.id, include_deleted, since)
        .await?;
    let progress = svc.progress_stats(project.id).await?;

    Ok(Json(MilestonesResponse {
        project,
        milestones,
        progress,
    }))
}

/// `POST /api/milestones/create?projectKey=KEY`.
pub(crate) async fn create(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    Json(payload): Json<CreatePayload>,
) -> Result<Json<MilestoneCreateResponse>, ApiError> {
    let key = require_param(&params, "projectKey")?;
    let (svc, project) = state.open_project(key).await?;

    let slug = svc
        .create_milestone(
            project.id,
            MilestoneDraft {
                title: payload.title,
                description: payload.description,
                status: payload.status,
                priority: payload.priority,
                owner: payload.owner,
                start_date: payload.start_date,
                due_date: payload.due_date,
                parent_slug: payload.parent_slug,
                expected_hours: payload.expected_hours,
            },
        )
        .await?;
    Ok(Json(MilestoneCreateResponse::new(slug)))
}

/// `POST /api/milestones/update?projectKey=KEY`.
pub(crate) async fn update(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    Json(payload): Json<UpdatePayload>,
) -> Result<Json<OkResponse>, ApiError> {
    let key = require_param(&params, "projectKey")?;
    if payload.slug.is_empty() {
        return Err(ApiError::bad_request("Missing slug"));
    }
    let (svc, project) = state.open_project(key).await?;

    let parent_slug = if payload.clear_parent {
        Some(None)
    } else {
        payload.parent_slug.map(Some)
    };
    svc.update_milestone(
        project.id,
        &payload.slug,
        MilestoneUpdate {
            title: payload.title,
            description: payload.description.map(Some),
            status: payload.status,
            priority: payload.priority,
            owner: payload.owner.map(Some),
            start_date: payload.start_date.map(Some),
            due_date: payload.due_date.map(Some),
            parent_slug,
            expected_hours: payload.expected_hours,
        },
    )
    .await?;
    Ok(Json(OkResponse::default()))
}

/// `POST /api/milestones/delete?projectKey=KEY`.
pub(crate) async fn delete(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    Json(payload): Json<DeletePayload>,
) -> Result<Json<OkResponse>, ApiError> {
    let key = require_param(&params, "projectKey")?;
    if payload.slug.is_empty() {
        return Err(ApiError::bad_request("Missing slug"));
    }
    let (svc, project) = state.open_project(key).await?;
    svc.delete_milestone(project.id, &payload.slug).await?;
    Ok(Json(OkResponse::default()))
}

/// `POST /api/milestones/logs/create?projectKey=KEY`.
pub(crate) async fn create_log(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    Json(payload): Json<CreateLogPayload>,
) -> Result<Json<LogResponse>, ApiError> {
    let key = require_param(&params, "projectKey")?;
    if payload.slug.is_empty() {
        return Err(ApiError::bad_request("Missing projectKey or slug"));
    }
    let (svc, project) = state.open_project(key).await?;

    let log = svc
        .add_log(
            project.id,
            &payload.slug,
            LogDraft {
                summary: payload.summary,
                author: payload.author,
                status: payload.status,
                progress: payload.progress,
            },
        )
        .await?;
    Ok(Json(LogResponse::new(log)))
}

/// `POST /api/milestones/logs/update?projectKey=KEY`.
pub(crate) async fn update_log(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    Json(payload): Json<UpdateLogPayload>,
) -> Result<Json<LogResponse>, ApiError> {
    let key = require_param(&params, "projectKey")?;
    if payload.slug.is_empty() {
        return Err(ApiError::bad_request("Missing projectKey or slug"));
    }
    let sequence = payload
        .sequence
        .ok_or_else(|| ApiError::bad_request("Missing sequence"))?;
    let (svc, project) = state.open_project(key).await?;

    let log = svc
        .edit_log(
            project.id,
            &payload.slug,
            sequence,
            LogEdit {
                summary: payload.summary,
                status: payload.status.map(Some),
                progress: payload.progress.map(Some),
            },
        )
        .await?;
    Ok(Json(LogResponse::new(log)))
}
