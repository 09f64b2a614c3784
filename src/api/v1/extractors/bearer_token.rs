/*
 * Responsibility
 * - access token ではなく opaque な refresh token を受ける endpoint 用の
 *   生の bearer credential (/refresh, /revoke)
 */
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::{AuthError, bearer};

/// The token part of `Authorization: Bearer <token>`, not validated.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer::token_from_headers(&parts.headers).map_err(AuthError::from)?;
        Ok(BearerToken(token.to_string()))
    }
}
