//! Web server module.
//!
//! Serves the dashboard shell and the JSON view it mirrors. The shell is
//! deliberately dumb: it forwards tab clicks, visibility changes and button
//! presses to the engine and copies rendered regions back into the page.

mod handlers;

pub use handlers::*;

use crate::app::AppContext;
use crate::render::html::HtmlRenderer;
use crate::sched::PollScheduler;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<AppContext>,
    pub renderer: Arc<HtmlRenderer>,
    pub scheduler: Arc<PollScheduler>,
}

/// Web server for FrameWatch.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a new server with the given dependencies.
    pub fn new(
        ctx: Arc<AppContext>,
        renderer: Arc<HtmlRenderer>,
        scheduler: Arc<PollScheduler>,
    ) -> Self {
        Self {
            state: AppState {
                ctx,
                renderer,
                scheduler,
            },
        }
    }

    /// Build the router with all routes.
    pub fn routes(&self) -> Router {
        let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);

        Router::new()
            // Dashboard
            .route("/", get(handlers::handle_dashboard))
            // View state for the shell
            .route("/api/view", get(handlers::handle_view))
            .route("/api/diagnostics", get(handlers::handle_diagnostics))
            .route(
                "/api/notifications/{id}/dismiss",
                post(handlers::handle_dismiss_notification),
            )
            // Control actions
            .route("/actions/camera/start", post(handlers::handle_start_camera))
            .route("/actions/camera/stop", post(handlers::handle_stop_camera))
            .route(
                "/actions/camera/restart",
                post(handlers::handle_restart_camera),
            )
            .route(
                "/actions/reset-statistics",
                post(handlers::handle_reset_statistics),
            )
            .route("/actions/cleanup", post(handlers::handle_cleanup))
            .route(
                "/actions/refresh-results",
                post(handlers::handle_refresh_results),
            )
            .route(
                "/actions/refresh-performance",
                post(handlers::handle_refresh_performance),
            )
            .route("/actions/force-update", post(handlers::handle_force_update))
            // UI state reported by the shell
            .route("/ui/tab", post(handlers::handle_tab))
            .route("/ui/visibility", post(handlers::handle_visibility))
            // Static assets
            .route("/favicon.ico", get(handlers::handle_favicon))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .layer(DefaultBodyLimit::max(1024 * 1024)) // 1MB
            .with_state(self.state.clone())
    }

    /// Start the server on the configured port. Returns after a shutdown
    /// signal, with the poll loops stopped.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.ctx.config.http_port));
        let router = self.routes();

        tracing::info!("Web server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        let scheduler = self.state.scheduler.clone();
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal(scheduler))
            .await?;

        Ok(())
    }
}

async fn shutdown_signal(scheduler: Arc<PollScheduler>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    scheduler.shutdown();
}
