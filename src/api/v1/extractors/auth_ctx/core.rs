use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::{AuthError, bearer};
use crate::state::AppState;

use super::AuthCtx;

/// Authenticates the request from its `Authorization: Bearer <access token>`
/// header. Any failure is a 401.
pub struct AuthCtxExtractor(pub AuthCtx);

impl FromRequestParts<AppState> for AuthCtxExtractor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = bearer::authorization(&parts.headers).map_err(AuthError::from)?;
        let user_id = state.guard.authenticate(header)?;

        Ok(AuthCtxExtractor(AuthCtx::new(user_id)))
    }
}
