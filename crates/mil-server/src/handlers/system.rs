//! Health and lifecycle endpoints.

use axum::Json;
use axum::extract::State;
use mil_core::responses::OkResponse;

use crate::AppState;

pub(crate) async fn health() -> Json<OkResponse> {
    Json(OkResponse::default())
}

pub(crate) async fn stop(State(state): State<AppState>) -> Json<OkResponse> {
    tracing::info!("stop requested");
    state.request_shutdown();
    Json(OkResponse::default())
}
