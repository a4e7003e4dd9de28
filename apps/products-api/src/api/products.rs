//! Products API routes

use axum::Router;
use domain_products::{handlers, realtime, MongoProductRepository, ProductService};

use crate::state::AppState;

fn repository(state: &AppState) -> MongoProductRepository {
    MongoProductRepository::with_collection(&state.db, &state.config.products.collection)
}

/// Create products router
pub fn router(state: &AppState) -> Router {
    let service = ProductService::new(repository(state), state.broadcaster.clone())
        .with_status_mode(state.config.products.status_mode);
    handlers::router(service)
}

/// WebSocket feed of product change events
pub fn realtime_router(state: &AppState) -> Router {
    realtime::router(state.broadcaster.clone())
}

/// Initialize products indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    repository(state).init_indexes().await?;
    Ok(())
}
