use std::sync::Arc;

use anyhow::Context;

use orgguard_api::app::{build_app, services::AppServices};
use orgguard_infra::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    orgguard_observability::init();

    let config = Config::from_env()?;
    let services = Arc::new(AppServices::from_config(&config).await?);

    let scheduler = services.scheduler(config.sweep_at).spawn();
    tracing::info!(at = %config.sweep_at, "daily sweep scheduled");

    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    let served = axum::serve(listener, app).await;
    scheduler.abort();
    served.context("server error")
}
