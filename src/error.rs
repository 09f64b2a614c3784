/*
 * Responsibility
 * - AppError: handler が返す唯一のエラー型
 * - IntoResponse (HTTP status / JSON error body)
 * - repo / auth / token / codec のエラーを変換 (詳細はサーバ側ログのみ)
 */
use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::repos::error::RepoError;
use crate::services::auth::{
    AuthError, password::PasswordError, refresh_token::RefreshTokenError,
    token_service::TokenServiceError,
};
use crate::services::id_codec::IdCodecError;

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
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("unauthorized")]
    Unauthorized,
    #[error("invalid login")]
    InvalidLogin,
    #[error("forbidden")]
    Forbidden,
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("conflict: {message}")]
    Conflict { message: String },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Unauthorized access".into(),
            ),
            AppError::InvalidLogin => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Incorrect email or password".into(),
            ),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", "Forbidden".into()),
            AppError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{resource} not found."),
            ),
            // duplicates are reported as a plain bad request
            AppError::Conflict { message } => (StatusCode::BAD_REQUEST, "CONFLICT", message),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::DuplicateConflict => AppError::conflict("already registered/used"),
            RepoError::Db(e) => {
                error!(error = %e, "database error");
                AppError::Internal
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            e if e.is_unauthenticated() => {
                debug!(error = %e, "request not authenticated");
                AppError::Unauthorized
            }
            AuthError::Forbidden => AppError::Forbidden,
            AuthError::NotFound => AppError::not_found("resource"),
            e => {
                error!(error = %e, "auth layer failure");
                AppError::Internal
            }
        }
    }
}

impl From<RefreshTokenError> for AppError {
    fn from(e: RefreshTokenError) -> Self {
        match e {
            RefreshTokenError::NotFound
            | RefreshTokenError::Expired
            | RefreshTokenError::Revoked => {
                debug!(error = %e, "refresh token rejected");
                AppError::Unauthorized
            }
            e => {
                error!(error = %e, "refresh token failure");
                AppError::Internal
            }
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(e: PasswordError) -> Self {
        match e {
            PasswordError::EmptyInput => {
                AppError::bad_request("INVALID_PASSWORD", "password is required")
            }
            PasswordError::Mismatch => AppError::InvalidLogin,
            e => {
                error!(error = %e, "password hashing failure");
                AppError::Internal
            }
        }
    }
}

impl From<TokenServiceError> for AppError {
    fn from(e: TokenServiceError) -> Self {
        match e {
            TokenServiceError::InvalidLogin => AppError::InvalidLogin,
            TokenServiceError::Password(e) => e.into(),
            TokenServiceError::RefreshToken(e) => e.into(),
            TokenServiceError::Store(e) => e.into(),
            TokenServiceError::AccessToken(e) => AuthError::from(e).into(),
        }
    }
}

impl From<IdCodecError> for AppError {
    fn from(e: IdCodecError) -> Self {
        match e {
            // client supplied a malformed public id (e.g. /posts/{id})
            IdCodecError::DecodeInvalidFormat | IdCodecError::DecodeOutOfRange => {
                AppError::bad_request("INVALID_PUBLIC_ID", "invalid id")
            }
            // server-side config / programming errors
            e => {
                error!(error = %e, "id codec failure");
                AppError::Internal
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        debug!(error = %e, "rejected request body");
        AppError::bad_request("INVALID_BODY", "Something went wrong")
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        debug!(error = %e, "rejected query string");
        AppError::bad_request("INVALID_QUERY", "invalid query parameters")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: impl Into<AppError>) -> StatusCode {
        let err: AppError = e.into();
        err.into_response().status()
    }

    #[test]
    fn auth_errors_map_to_statuses() {
        for e in [
            AuthError::MissingCredential,
            AuthError::MalformedCredential,
            AuthError::BadSignature,
            AuthError::Expired,
            AuthError::Revoked,
        ] {
            assert_eq!(status_of(e), StatusCode::UNAUTHORIZED);
        }
        assert_eq!(status_of(AuthError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status_of(AuthError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(AuthError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn refresh_token_errors_are_401_except_store() {
        assert_eq!(
            status_of(RefreshTokenError::Revoked),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(RefreshTokenError::NotFound),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(RefreshTokenError::Random("no entropy".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn repo_conflict_is_bad_request() {
        assert_eq!(status_of(RepoError::DuplicateConflict), StatusCode::BAD_REQUEST);
    }
}
