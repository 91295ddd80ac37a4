mod config;
mod domain;
mod report;
mod services;
mod state;
mod web;

use crate::config::AppConfig;
use crate::domain::catalog::Catalog;
use crate::state::{AppState, SharedState};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    tracing::info!("Loading chapter catalog from {}", config.catalog_path.display());
    let catalog = Catalog::load(&config.catalog_path).map_err(|e| {
        tracing::error!("Failed to load chapter catalog: {}", e);
        e
    })?;

    let shared: SharedState = Arc::new(AppState::new(catalog, &config));

    // Reports refuse to render without this exact font; surface it before the first request.
    match shared.font.get() {
        Ok(font) => tracing::info!("Report font ready: {}", font.path().display()),
        Err(e) => tracing::error!("{}. Report downloads will fail until it is installed", e),
    }

    // Session cleanup - drop idle quiz sessions every hour
    let scheduler = JobScheduler::new().await?;
    let shared_for_cleanup = shared.clone();
    scheduler
        .add(Job::new_async("0 0 * * * *", move |_uuid, _l| {
            let state = shared_for_cleanup.clone();
            Box::pin(async move {
                let evicted = state.evict_idle_sessions(chrono::Utc::now()).await;
                if evicted > 0 {
                    tracing::info!("Cleaned up {} idle quiz sessions", evicted);
                }
            })
        })?)
        .await?;
    scheduler.start().await?;
    tracing::info!(
        "Scheduler started: idle sessions expire after {}h",
        config.session_ttl_hours
    );

    let app = web::routes(shared).layer(TraceLayer::new_for_http());

    tracing::info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
