//! Project registry endpoints.

use std::path::PathBuf;

use axum::Json;
use axum::extract::State;
use mil_core::responses::OkResponse;
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;
use crate::registry::ProjectEntry;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RegisterPayload {
    project_key: Option<String>,
    state_dir: Option<String>,
    name: Option<String>,
    description: Option<String>,
    path: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ResetPayload {
    project_key: Option<String>,
}

/// `GET /api/projects` — every registered project.
pub(crate) async fn list(State(state): State<AppState>) -> Json<Vec<ProjectEntry>> {
    Json(state.registry().read().await.entries())
}

/// `POST /api/projects/register` — validate a state directory and record it.
///
/// The project must already exist in its database; registration only makes
/// the dashboard aware of it.
pub(crate) async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<Json<OkResponse>, ApiError> {
    let key = payload
        .project_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing projectKey or stateDir"))?;
    let state_dir = payload
        .state_dir
        .as_deref()
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| ApiError::bad_request("Missing projectKey or stateDir"))?;

    let entry = ProjectEntry {
        key: key.to_string(),
        name: String::new(),
        description: payload.description.clone(),
        path: payload
            .path
            .clone()
            .or_else(|| state_dir.parent().map(|p| p.display().to_string())),
        state_dir,
    };

    // Structural validation before opening: directory and database present.
    let mut registry = state.registry().write().await;
    if !entry.state_dir.is_dir() {
        return Err(ApiError::bad_request("stateDir does not exist"));
    }
    if !entry.db_path().is_file() {
        return Err(ApiError::bad_request("milstone.db not found in stateDir"));
    }

    // The key must resolve inside the database; this also fills in the
    // stored name/description when the payload omits them.
    let svc = mil_db::service::MilService::open_local(
        &entry.db_path().to_string_lossy(),
        Box::new(state.authority().clone()),
    )
    .await?;
    let project = svc
        .get_project(key)
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to validate project: {e}")))?;

    let entry = ProjectEntry {
        name: payload.name.unwrap_or(project.name),
        description: entry.description.or(project.description),
        ..entry
    };
    registry.register(entry)?;
    Ok(Json(OkResponse::default()))
}

/// `POST /api/projects/reset` — wipe all data owned by a project.
pub(crate) async fn reset(
    State(state): State<AppState>,
    Json(payload): Json<ResetPayload>,
) -> Result<Json<OkResponse>, ApiError> {
    let key = payload
        .project_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing projectKey"))?;

    let (svc, project) = state.open_project(key).await?;
    svc.reset_project(project.id).await?;
    Ok(Json(OkResponse::default()))
}
