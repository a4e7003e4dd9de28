//! API routes module

pub mod health;
pub mod products;

use axum::Router;
use axum_helpers::{create_router, CorsError};

use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Routes served under `/api`
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/products", products::router(state))
        .nest("/ws", products::realtime_router(state))
}

/// Full application: `/api`, docs, `/health` and `/ready`
pub fn app(state: &AppState) -> Result<Router, CorsError> {
    let router = create_router::<ApiDoc>(routes(state))?;
    Ok(router.merge(health::router(state)))
}

/// Initialize database indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    products::init_indexes(state).await
}
