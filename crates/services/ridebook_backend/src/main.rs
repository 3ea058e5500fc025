// File: services/ridebook_backend/src/main.rs
use ridebook_backend::{build_app, AppState};
use ridebook_common::{config_error, logging, RidebookError};
use ridebook_config::load_config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    logging::init();

    if let Err(e) = run().await {
        error!("Ridebook backend stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), RidebookError> {
    let config = Arc::new(load_config().map_err(config_error)?);
    let state = AppState::from_config(config.clone())?;
    let app = build_app(&state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
