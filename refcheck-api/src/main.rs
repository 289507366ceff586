//! Refcheck API server

use std::sync::Arc;

use refcheck_api::{config::ServerConfig, observability::init_tracing, router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ServerConfig::from_env()?;
    config.budgets.check_hierarchy();

    for (service, url) in config.endpoints.iter() {
        tracing::info!(service, url, "sibling service endpoint");
    }

    let state = Arc::new(AppState::new(config.endpoints, config.budgets)?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Starting Refcheck API on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
