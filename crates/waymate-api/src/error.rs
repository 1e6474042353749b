use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Typed failures the workflow layer can produce. Every variant carries the
/// message sent to the client; dependency and internal failures log their
/// detail and send a generic message instead.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// OTP mismatch/expiry and bad reset tokens.
    #[error("{0}")]
    Auth(String),

    /// Missing or invalid credentials.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    /// Media storage collaborator failed on the critical path.
    #[error("Media storage error: {0}")]
    Storage(String),

    /// Email dispatch collaborator failed.
    #[error("Email dispatch error: {0}")]
    Email(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Auth(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            ApiError::Storage(detail) => {
                error!("Storage dependency failure: {}", detail);
                (StatusCode::BAD_GATEWAY, "Media storage is unavailable".to_string())
            }
            ApiError::Email(detail) => {
                error!("Email dependency failure: {}", detail);
                (StatusCode::BAD_GATEWAY, "Email dispatch failed".to_string())
            }
            ApiError::Internal(e) => {
                error!("Internal error: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong".to_string())
            }
        };

        // 4xx are client faults ("fail"), 5xx are ours ("error").
        let kind = if status.is_client_error() { "fail" } else { "error" };

        let body = serde_json::json!({
            "status": kind,
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        let cases = [
            (ApiError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Auth("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
            (ApiError::Storage("x".into()), StatusCode::BAD_GATEWAY),
            (ApiError::Email("x".into()), StatusCode::BAD_GATEWAY),
            (
                ApiError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn internal_detail_is_not_sent_to_clients() {
        let resp = ApiError::Internal(anyhow::anyhow!("db exploded at row 17")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // body is generic; the detail only goes to the log
    }
}
