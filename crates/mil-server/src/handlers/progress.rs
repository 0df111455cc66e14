//! Progress snapshot endpoints.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Query, State};
use mil_core::entities::ProgressSnapshot;
use mil_core::responses::SnapshotResponse;
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;
use crate::handlers::require_param;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub(crate) struct ResetPayload {
    label: Option<String>,
}

/// `GET /api/progress/history?project=KEY` — snapshots, newest first.
pub(crate) async fn history(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<ProgressSnapshot>>, ApiError> {
    let key = require_param(&params, "project")?;
    let (svc, project) = state.open_project(key).await?;
    Ok(Json(svc.snapshot_history(project.id).await?))
}

/// `POST /api/progress/reset?projectKey=KEY` — freeze the current period.
pub(crate) async fn reset(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    Json(payload): Json<ResetPayload>,
) -> Result<Json<SnapshotResponse>, ApiError> {
    let key = require_param(&params, "projectKey")?;
    let (svc, project) = state.open_project(key).await?;
    let snapshot = svc
        .record_snapshot(project.id, payload.label.as_deref())
        .await?;
    Ok(Json(SnapshotResponse::new(snapshot)))
}
