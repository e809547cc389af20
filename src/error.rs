/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - AuthError / AccessDenied / RepoError を統一的に変換
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::access_guard::DenyReason;
use crate::services::auth::AuthError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    ServerMisconfigured(String),
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Access Guard の Deny を HTTP エラーへ。`resource` はメッセージ用 ("strategy", "thread")
    pub fn denied(reason: DenyReason, resource: &str) -> Self {
        match reason {
            DenyReason::AuthenticationRequired => Self::Unauthorized(format!(
                "Authentication required: this {resource} belongs to a user"
            )),
            DenyReason::Forbidden => Self::Forbidden(format!(
                "Access denied: {resource} belongs to another user"
            )),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::ServerMisconfigured(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "SERVER_MISCONFIGURED",
            ),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Unauthorized(message) => AppError::Unauthorized(message),
            AuthError::ServerMisconfigured(message) => {
                tracing::error!(%message, "token verification backend unavailable");
                AppError::ServerMisconfigured("authentication backend unavailable".to_string())
            }
        }
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        // Details stay in the log; the client only sees a 500.
        tracing::error!(error = %e, "repository failure");
        AppError::Internal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let cases = [
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (AppError::not_found("x"), StatusCode::NOT_FOUND),
            (
                AppError::ServerMisconfigured("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::Internal, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn denied_maps_reason_to_status() {
        let unauth = AppError::denied(DenyReason::AuthenticationRequired, "thread");
        assert!(matches!(unauth, AppError::Unauthorized(ref m) if m.contains("thread")));

        let forbidden = AppError::denied(DenyReason::Forbidden, "strategy");
        assert_eq!(
            forbidden.to_string(),
            "Access denied: strategy belongs to another user"
        );
    }

    #[test]
    fn backend_failure_is_500_not_401() {
        let err = AppError::from(AuthError::ServerMisconfigured("jwks down".into()));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
