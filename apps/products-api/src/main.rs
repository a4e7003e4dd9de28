//! Products API - REST server with a realtime WebSocket feed

use axum_helpers::create_app;
use core_config::tracing::{init_tracing, install_color_eyre};
use database::mongodb::connect_with_retry;
use database::RetryConfig;
use domain_products::ChannelBroadcaster;
use std::sync::Arc;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!("Connecting to MongoDB at {}", config.mongodb.redacted_url());

    let mongo_client = connect_with_retry(&config.mongodb, &RetryConfig::default()).await?;
    let db = mongo_client.database(&config.mongodb.database);

    info!(
        "Successfully connected to MongoDB database: {}",
        config.mongodb.database
    );

    let state = AppState {
        broadcaster: Arc::new(ChannelBroadcaster::new(
            config.products.broadcast_capacity,
        )),
        config,
        mongo_client,
        db,
    };

    api::init_indexes(&state).await?;

    let app = api::app(&state)?;

    info!(
        status_mode = %state.config.products.status_mode,
        "Starting Products API on port {}",
        state.config.server.port
    );

    let server_config = state.config.server.clone();
    let mongo_client = state.mongo_client.clone();
    create_app(app, &server_config, async move {
        info!("Shutting down: closing MongoDB connections");
        mongo_client.shutdown().await;
        info!("MongoDB connection closed");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Products API shutdown complete");
    Ok(())
}
