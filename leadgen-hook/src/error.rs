//! Error types for leadgen-hook
//!
//! Every receiver failure renders as the JSON failure envelope
//! `{ success: false, message, error?, errors? }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use leadgen_common::api::FailureResponse;
use leadgen_common::search::FieldError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Route exists but not for this method (405)
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Body or query string rejected by the extractor before any handler logic
    #[error("{message}: {detail}")]
    Rejected {
        status: StatusCode,
        message: String,
        detail: String,
    },

    /// Search query failed validation (400)
    #[error("Invalid search data")]
    Validation(Vec<FieldError>),

    /// Required integration is not configured (500)
    #[error("{0}")]
    Config(String),

    /// Upstream service answered with an error or was unreachable (500)
    #[error("{0}")]
    Upstream(String),

    /// Result store operation failed (500)
    #[error("{message}: {source}")]
    Store {
        message: &'static str,
        source: leadgen_common::Error,
    },
}

impl ApiError {
    pub fn store(message: &'static str) -> impl FnOnce(leadgen_common::Error) -> Self {
        move |source| ApiError::Store { message, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                FailureResponse::new("Method not allowed"),
            ),
            ApiError::Rejected {
                status,
                message,
                detail,
            } => (status, FailureResponse::new(message).with_error(detail)),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                FailureResponse::new("Invalid search data").with_errors(json!(errors)),
            ),
            ApiError::Config(message) => {
                error!("Configuration error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    FailureResponse::new(message),
                )
            }
            ApiError::Upstream(message) => {
                error!("Upstream error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    FailureResponse::new(message),
                )
            }
            ApiError::Store { message, source } => {
                error!("{}: {}", message, source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    FailureResponse::new(message).with_error(source.to_string()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_method_not_allowed_body() {
        let (status, body) = body_of(ApiError::MethodNotAllowed).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, json!({"success": false, "message": "Method not allowed"}));
    }

    #[tokio::test]
    async fn test_store_error_carries_cause() {
        let err = ApiError::store("Error processing webhook data")(leadgen_common::Error::Internal(
            "disk full".to_string(),
        ));
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Error processing webhook data");
        assert_eq!(body["error"], "Internal error: disk full");
    }

    #[tokio::test]
    async fn test_config_error_has_no_cause_field() {
        let (status, body) =
            body_of(ApiError::Config("Discord webhook URL not configured".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.get("error").is_none());
    }
}
