use axum::http::{HeaderValue, Method, header};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub const CORS_ORIGIN_ENV: &str = "CORS_ALLOWED_ORIGIN";

const ALLOWED_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::OPTIONS,
];

#[derive(Debug, thiserror::Error)]
pub enum CorsError {
    #[error("CORS_ALLOWED_ORIGIN contains an invalid origin: {0}")]
    InvalidOrigin(String),
}

/// Parse a comma-separated origin list. Blank entries are skipped.
pub fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, CorsError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| HeaderValue::from_str(s).map_err(|_| CorsError::InvalidOrigin(s.to_string())))
        .collect()
}

/// CORS layer for a fixed list of origins, with credentials.
pub fn create_cors_layer(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Any origin, any header, no credentials.
pub fn create_open_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(ALLOWED_METHODS)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600))
}

/// Build the CORS layer from `CORS_ALLOWED_ORIGIN`.
///
/// Unset or blank opens the API to every origin. Otherwise only the listed
/// origins are allowed and credentials are accepted.
pub fn cors_layer_from_env() -> Result<CorsLayer, CorsError> {
    let raw = std::env::var(CORS_ORIGIN_ENV).unwrap_or_default();
    let origins = parse_origins(&raw)?;

    if origins.is_empty() {
        tracing::info!("CORS open to any origin");
        return Ok(create_open_cors_layer());
    }

    tracing::info!("CORS configured with allowed origins: {}", raw);
    Ok(create_cors_layer(origins))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_trims_and_skips_blanks() {
        let origins = parse_origins(" http://localhost:3000, ,https://example.com ").unwrap();
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0], "http://localhost:3000");
        assert_eq!(origins[1], "https://example.com");
    }

    #[test]
    fn test_parse_origins_rejects_invalid() {
        let err = parse_origins("http://ok.com,bad\norigin").unwrap_err();
        assert!(matches!(err, CorsError::InvalidOrigin(_)));
    }

    #[test]
    fn test_from_env_unset_is_open() {
        temp_env::with_var_unset(CORS_ORIGIN_ENV, || {
            assert!(cors_layer_from_env().is_ok());
        });
    }

    #[test]
    fn test_from_env_invalid_fails() {
        temp_env::with_var(CORS_ORIGIN_ENV, Some("bad\norigin"), || {
            assert!(cors_layer_from_env().is_err());
        });
    }
}
