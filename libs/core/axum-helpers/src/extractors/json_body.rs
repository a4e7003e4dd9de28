//! JSON extractor whose rejections use the shared error body.

use crate::errors::ErrorResponse;
use axum::{
    extract::{FromRequest, Json, Request},
    response::Response,
};
use serde::de::DeserializeOwned;

/// Drop-in for `axum::Json` on the request side.
///
/// A missing content type, malformed JSON or a field of the wrong type
/// answers with the status axum picks and `{ "error": "..." }` instead of
/// a plain-text body.
///
/// ```ignore
/// async fn create(JsonBody(input): JsonBody<CreateProduct>) -> Response { ... }
/// ```
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                tracing::info!(status = %rejection.status(), "Rejected JSON body: {}", rejection.body_text());
                Err(ErrorResponse::new(rejection.body_text()).with_status(rejection.status()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request as HttpRequest, http::StatusCode, routing::post};
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Input {
        price: f64,
    }

    async fn echo(JsonBody(input): JsonBody<Input>) -> String {
        input.price.to_string()
    }

    fn request(body: &str, content_type: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_is_extracted() {
        let app = Router::new().route("/", post(echo));
        let response = app
            .oneshot(request(r#"{"price": 9.5}"#, Some("application/json")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_wrong_type_is_json_error() {
        let app = Router::new().route("/", post(echo));
        let response = app
            .oneshot(request(r#"{"price": "cheap"}"#, Some("application/json")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(body.error.contains("price"));
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let app = Router::new().route("/", post(echo));
        let response = app.oneshot(request("{}", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
