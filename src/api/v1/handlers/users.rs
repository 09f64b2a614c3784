/*
 * Responsibility
 * - POST /users (登録), PUT /users (自分の email/password 変更)
 * - PUT は呼び出し元自身が対象なので所有者チェック不要
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::info;

use crate::{
    api::v1::{
        dto::users::{CredentialsRequest, UserResponse},
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    services::auth::password,
    state::AppState,
};

pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let Json(req) = payload?;
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_USER", msg))?;

    let hashed = password::hash(&req.password)?;
    let row = state.users.create_user(req.email.trim(), &hashed).await?;

    info!(user_id = %row.id, "User registered");
    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn update_user(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let Json(req) = payload?;
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_USER", msg))?;

    let hashed = password::hash(&req.password)?;
    let row = state
        .users
        .update_user_credential(ctx.user_id, req.email.trim(), &hashed)
        .await?
        .ok_or(AppError::not_found("user"))?;

    info!(user_id = %row.id, "User credentials updated");
    Ok(Json(row.into()))
}
