/// Error types for the blog service.
///
/// Every failure path converges on [`AppError`], which knows how to render
/// itself as an HTTP response with the `{error, message}` envelope the API
/// exposes to clients.
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type for service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),

    /// Missing, malformed, or invalid credentials/token
    #[error("{0}")]
    Unauthorized(String),

    /// Valid token whose lifetime has elapsed; carries the original expiry
    #[error("Token expired, please login again")]
    TokenExpired { expired_at: DateTime<Utc> },

    /// Valid identity, insufficient privilege
    #[error("{0}")]
    Forbidden(String),

    /// Referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness conflict (duplicate username/email, concurrent like)
    #[error("{0}")]
    Conflict(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Anything else
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Short machine-readable kind for the response envelope
    fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "Validation error",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::TokenExpired { .. } => "Token expired",
            AppError::Forbidden(_) => "Forbidden",
            AppError::NotFound(_) => "Not found",
            AppError::Conflict(_) => "Conflict",
            AppError::Database(_) | AppError::Internal(_) => "Internal server error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::TokenExpired { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let body = match self {
            // Clients use the original expiry to distinguish "login again"
            // from a malformed request.
            AppError::TokenExpired { expired_at } => serde_json::json!({
                "error": self.kind(),
                "message": self.to_string(),
                "expired_at": expired_at,
            }),
            // Internal detail is logged, never returned.
            AppError::Database(msg) | AppError::Internal(msg) => {
                tracing::error!("{}: {}", self.kind(), msg);
                serde_json::json!({
                    "error": self.kind(),
                    "message": "An unexpected error occurred",
                })
            }
            _ => serde_json::json!({
                "error": self.kind(),
                "message": self.to_string(),
            }),
        };

        HttpResponse::build(status).json(body)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            return AppError::Conflict("Resource already exists".to_string());
        }
        AppError::Database(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Whether a sqlx error is a unique-constraint violation, so registration
/// races and concurrent like inserts can surface as 409 instead of 500.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.is_unique_violation()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized("no token".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::TokenExpired { expired_at: Utc::now() }.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("nope".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotFound("gone".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict("taken".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_not_leaked() {
        let err = AppError::Database("password=hunter2".into());
        let resp = err.error_response();
        let body = actix_web::body::to_bytes(resp.into_body());
        let bytes = futures::executor::block_on(body).unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!text.contains("hunter2"));
    }

    #[test]
    fn test_expired_response_carries_expiry() {
        let expired_at = Utc::now();
        let err = AppError::TokenExpired { expired_at };
        let resp = err.error_response();
        let bytes =
            futures::executor::block_on(actix_web::body::to_bytes(resp.into_body())).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["error"], "Token expired");
        assert!(value["expired_at"].is_string());
    }
}
