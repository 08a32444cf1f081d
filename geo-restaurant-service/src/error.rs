use std::collections::BTreeMap;

use axum::{http::StatusCode, response::Json};
use serde::Serialize;
use serde_json::json;
use tracing::error;
use utoipa::ToSchema;

use crate::repository::RepoError;
use crate::serializer::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(ValidationErrors),
    #[error("Malformed request body: {0}")]
    MalformedBody(String),
    #[error("Not found")]
    NotFound,
    #[error("Internal server error: {0}")]
    InternalError(String),
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Error message
    pub error: String,
    /// Messages per field, present on validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        ApiError::InternalError(value.to_string())
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match &self {
            ApiError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": self.to_string(), "fields": fields }),
            ),
            ApiError::MalformedBody(_) => {
                (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() }))
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, json!({ "error": self.to_string() })),
            ApiError::InternalError(msg) => {
                error!(%msg, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
