//! # mil-server
//!
//! HTTP JSON dashboard service for Milstone. Serves the project registry,
//! milestone and progress views, and the decision/override API over the
//! per-project libSQL databases.

pub mod error;
pub mod handlers;
pub mod registry;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use mil_config::AuthorityConfig;
use mil_core::entities::Project;
use mil_db::service::MilService;
use tokio::sync::{Notify, RwLock};

use error::ApiError;
use registry::Registry;

struct AppStateInner {
    registry: RwLock<Registry>,
    authority: AuthorityConfig,
    shutdown: Notify,
}

/// Shared handler state: the project registry, the authority policy handed
/// to every opened database, and the shutdown signal.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

impl AppState {
    #[must_use]
    pub fn new(registry: Registry, authority: AuthorityConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                registry: RwLock::new(registry),
                authority,
                shutdown: Notify::new(),
            }),
        }
    }

    pub(crate) fn registry(&self) -> &RwLock<Registry> {
        &self.inner.registry
    }

    pub(crate) fn authority(&self) -> &AuthorityConfig {
        &self.inner.authority
    }

    /// Open the database behind a registered project key.
    ///
    /// Databases are opened per request; for a local single-user dashboard
    /// the open cost is negligible and it keeps every request seeing fresh
    /// on-disk state.
    pub(crate) async fn open_project(
        &self,
        key: &str,
    ) -> Result<(MilService, Project), ApiError> {
        let entry = self
            .registry()
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Project not registered."))?;

        let db_path = entry.db_path();
        if !db_path.is_file() {
            return Err(ApiError::bad_request(format!(
                "Missing database at {}",
                db_path.display()
            )));
        }

        let svc = MilService::open_local(
            &db_path.to_string_lossy(),
            Box::new(self.authority().clone()),
        )
        .await?;
        let project = svc.get_project(key).await?;
        Ok((svc, project))
    }

    /// Ask the server to shut down gracefully.
    pub fn request_shutdown(&self) {
        self.inner.shutdown.notify_one();
    }

    async fn wait_shutdown(&self) {
        self.inner.shutdown.notified().await;
    }
}

/// Build the full API router.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/projects", get(handlers::projects::list))
        .route("/api/projects/register", post(handlers::projects::register))
        .route("/api/projects/reset", post(handlers::projects::reset))
        .route("/api/milestones", get(handlers::milestones::list))
        .route("/api/milestones/create", post(handlers::milestones::create))
        .route("/api/milestones/update", post(handlers::milestones::update))
        .route("/api/milestones/delete", post(handlers::milestones::delete))
        .route(
            "/api/milestones/logs/create",
            post(handlers::milestones::create_log),
        )
        .route(
            "/api/milestones/logs/update",
            post(handlers::milestones::update_log),
        )
        .route("/api/progress/history", get(handlers::progress::history))
        .route("/api/progress/reset", post(handlers::progress::reset))
        .route("/api/decisions", get(handlers::decisions::list))
        .route("/api/decisions/create", post(handlers::decisions::create))
        .route("/api/decisions/active", get(handlers::decisions::active))
        .route("/api/decisions/{id}", get(handlers::decisions::detail))
        .route("/api/decisions/link", post(handlers::decisions::link))
        .route("/api/decisions/override", post(handlers::decisions::override_targets))
        .route(
            "/api/decisions/override-request",
            post(handlers::decisions::override_request),
        )
        .route("/__health", get(handlers::system::health))
        .route("/__stop", post(handlers::system::stop))
        .with_state(state)
}

/// Bind and serve until `/__stop` or Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn run(state: AppState, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "dashboard service listening");

    let shutdown_state = state.clone();
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move {
            tokio::select! {
                () = shutdown_state.wait_shutdown() => {
                    tracing::info!("shutdown requested via /__stop");
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("shutdown requested via signal");
                }
            }
        })
        .await?;
    Ok(())
}
