//! FrameWatch - Camera Monitoring Dashboard
//!
//! Polls a camera analysis service and serves a live dashboard.

use framewatch::app::AppContext;
use framewatch::config::AppConfig;
use framewatch::render::html::HtmlRenderer;
use framewatch::sched::PollScheduler;
use framewatch::web::Server;

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("framewatch=info".parse()?),
        )
        .init();

    // Load configuration
    let cfg = AppConfig::load();
    tracing::info!("Starting FrameWatch on port {}...", cfg.http_port);
    tracing::info!("Watching camera service at {}", cfg.api_url);

    // Wire up the context
    let renderer = Arc::new(HtmlRenderer::new());
    let ctx = AppContext::new(cfg, renderer.clone())?;

    // Start polling
    let scheduler = Arc::new(PollScheduler::new(ctx.clone()));
    scheduler.start();

    // Start web server
    let server = Server::new(ctx, renderer, scheduler);
    server.start().await?;

    Ok(())
}
