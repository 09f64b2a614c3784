/*
 * Responsibility
 * - POST /login: email + password → access token + refresh token
 * - POST /refresh: refresh token (Bearer) → 新しい access token
 * - POST /revoke: refresh token (Bearer) → 失効
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    api::v1::{
        dto::{
            auth::{LoginResponse, TokenResponse},
            users::CredentialsRequest,
        },
        extractors::BearerToken,
    },
    error::AppError,
    state::AppState,
};

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(req) = payload?;
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_LOGIN", msg))?;

    let outcome = state.tokens.login(req.email.trim(), &req.password).await?;

    Ok(Json(LoginResponse {
        user: outcome.user.into(),
        token: outcome.access_token,
        refresh_token: outcome.refresh_token,
    }))
}

pub async fn refresh(
    State(state): State<AppState>,
    BearerToken(refresh_token): BearerToken,
) -> Result<Json<TokenResponse>, AppError> {
    let token = state.tokens.refresh(&refresh_token).await?;
    Ok(Json(TokenResponse { token }))
}

pub async fn revoke(
    State(state): State<AppState>,
    BearerToken(refresh_token): BearerToken,
) -> Result<StatusCode, AppError> {
    state.tokens.revoke(&refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}
