use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_helpers::ErrorResponse;
use strum::{Display, EnumString};
use thiserror::Error;

/// Rejection for a malformed id on lookup
pub const INVALID_ID_LOOKUP: &str = "Ingrese un id valido de MongoDB";
/// Rejection for a malformed id on update and delete
pub const INVALID_ID_MUTATION: &str = "Enter a valid MongoDB id";

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("{message}")]
    InvalidId { id: String, message: &'static str },

    #[error("{0}")]
    InvalidQuery(String),

    #[error("Check unfilled fields")]
    UnfilledFields(Vec<&'static str>),

    #[error("Product not found")]
    Missing,

    #[error("Product {0} not found")]
    Fetch(String),

    #[error("{0}")]
    List(String),

    #[error("{0}")]
    CodeLookup(String),

    #[error("Product with code {0} is already registered")]
    DuplicateCode(String),

    #[error("There is already another product with the code {0}")]
    CodeTaken(String),

    #[error("Error when the product was created")]
    CreateFailed(String),

    #[error("Error when modifying the product")]
    UpdateFailed(String),

    #[error("Product {0} doesnt exist")]
    NotFound(String),

    #[error("Error deleting product {id}")]
    DeleteFailed { id: String, cause: String },

    #[error("Database error: {0}")]
    Database(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

/// How errors are mapped onto HTTP status codes.
///
/// `Legacy` keeps the codes existing clients rely on: some failures answer
/// 200 with an `error` body and write failures answer 300.
/// `Conventional` uses the usual 4xx/5xx codes. The body is the same in both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StatusMode {
    #[default]
    Legacy,
    Conventional,
}

impl ProductError {
    pub fn status_code(&self, mode: StatusMode) -> StatusCode {
        let conventional = mode == StatusMode::Conventional;
        match self {
            ProductError::InvalidId { .. } | ProductError::InvalidQuery(_) => {
                StatusCode::BAD_REQUEST
            }
            ProductError::UnfilledFields(_) if conventional => StatusCode::UNPROCESSABLE_ENTITY,
            ProductError::UnfilledFields(_) => StatusCode::OK,
            ProductError::Missing if conventional => StatusCode::NOT_FOUND,
            ProductError::Missing => StatusCode::OK,
            ProductError::Fetch(_) | ProductError::List(_) if conventional => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProductError::Fetch(_) | ProductError::List(_) => StatusCode::BAD_REQUEST,
            ProductError::CodeLookup(_) | ProductError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProductError::DuplicateCode(_) | ProductError::CodeTaken(_) if conventional => {
                StatusCode::CONFLICT
            }
            ProductError::DuplicateCode(_) | ProductError::CodeTaken(_) => StatusCode::BAD_REQUEST,
            ProductError::CreateFailed(_)
            | ProductError::UpdateFailed(_)
            | ProductError::DeleteFailed { .. }
                if conventional =>
            {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProductError::CreateFailed(_)
            | ProductError::UpdateFailed(_)
            | ProductError::DeleteFailed { .. } => StatusCode::MULTIPLE_CHOICES,
            ProductError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Message of the underlying failure without the variant's wording
    pub fn into_cause(self) -> String {
        match self {
            ProductError::Database(message) => message,
            other => other.to_string(),
        }
    }

    /// Render as `{ "error": message }` with the status for `mode`
    pub fn into_response_with(self, mode: StatusMode) -> Response {
        let status = self.status_code(mode);

        match &self {
            ProductError::CreateFailed(cause) | ProductError::UpdateFailed(cause) => {
                tracing::error!(status = %status, cause = %cause, "{}", self);
            }
            ProductError::DeleteFailed { cause, .. } => {
                tracing::error!(status = %status, cause = %cause, "{}", self);
            }
            ProductError::CodeLookup(_) | ProductError::Database(_) | ProductError::List(_) => {
                tracing::error!(status = %status, "{}", self);
            }
            ProductError::UnfilledFields(fields) => {
                tracing::info!(status = %status, fields = ?fields, "{}", self);
            }
            _ => tracing::info!(status = %status, "{}", self),
        }

        ErrorResponse::new(self.to_string()).with_status(status)
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        self.into_response_with(StatusMode::Legacy)
    }
}

impl From<mongodb::error::Error> for ProductError {
    fn from(err: mongodb::error::Error) -> Self {
        ProductError::Database(err.to_string())
    }
}
