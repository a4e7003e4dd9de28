//! Liveness and readiness endpoints

use axum::{extract::State, response::Response, routing::get, Router};
use axum_helpers::{health_router, run_health_checks, HealthCheckFuture};
use database::mongodb::check_health;

use crate::state::AppState;

/// 200 when MongoDB answers a ping, 503 otherwise
async fn ready(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture)> =
        vec![("mongodb", Box::pin(check_health(&state.mongo_client)))];
    run_health_checks(checks).await
}

pub fn router(state: &AppState) -> Router {
    Router::new()
        .route("/ready", get(ready))
        .with_state(state.clone())
        .merge(health_router(state.config.app))
}
