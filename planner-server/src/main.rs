mod routes;
mod state;

use anyhow::{Context, Result};
use planner_core::PlannerConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = PlannerConfig::load()?;
    let data_dir = config.data_path();

    // Fails if another server or a CLI already has this directory open
    let store = config
        .open_store()
        .with_context(|| format!("Failed to load store from {}", data_dir.display()))?;
    let state = AppState::new(store);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, data_dir = %data_dir.display(), "planner-server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
