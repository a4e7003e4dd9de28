use axum::{http::StatusCode, response::Response};

use super::ErrorResponse;

/// Fallback for unmatched routes.
pub async fn not_found() -> Response {
    ErrorResponse::new("The requested resource was not found").with_status(StatusCode::NOT_FOUND)
}

/// Fallback for a known path called with an unsupported method.
pub async fn method_not_allowed() -> Response {
    ErrorResponse::new("The HTTP method is not allowed for this resource")
        .with_status(StatusCode::METHOD_NOT_ALLOWED)
}
