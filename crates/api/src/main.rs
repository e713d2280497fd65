//! Clinica - medical practice portal service
//!
//! Main entry point for the HTTP server.

use std::sync::Arc;

use clinica_lib::{routes, AppContext};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging FIRST so we can see .env loading
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("clinica=info,clinica_lib=info,clinica_infra=info,clinica_core=info")),
        )
        .init();

    // Load environment variables from .env file
    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(err) => debug!(error = %err, "no .env file loaded"),
    }

    let config = clinica_infra::config::load()?;
    let ctx = Arc::new(AppContext::new(&config)?);

    let app = routes::router(ctx);
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!(addr = %config.server.bind_addr, "clinica listening");
    axum::serve(listener, app).await?;

    Ok(())
}
