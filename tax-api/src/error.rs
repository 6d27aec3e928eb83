use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tax_core::{RepositoryError, TaxServiceError};
use thiserror::Error;

const SERVER_ERROR: &str = "Server error";

/// Every failure an HTTP handler can return. Each maps to a JSON body with a
/// stable `error` string.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Not found")]
    RouteNotFound,

    #[error(transparent)]
    Tax(#[from] TaxServiceError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::Tax(TaxServiceError::InvalidRequest(_) | TaxServiceError::Validation(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Tax(TaxServiceError::NoBracketsFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Tax(TaxServiceError::Infrastructure(_)) | ApiError::Repository(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Tax(TaxServiceError::Infrastructure(details)) => {
                json!({ "error": SERVER_ERROR, "details": details })
            }
            ApiError::Repository(err) => {
                json!({ "error": SERVER_ERROR, "details": err.to_string() })
            }
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
