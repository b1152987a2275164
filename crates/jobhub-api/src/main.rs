//! JobHub API server entry point.

use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use jobhub_api::{create_router, ApiConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ApiConfig::from_env();
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let state = AppState::new(config)?;
    let app = create_router(state);

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
