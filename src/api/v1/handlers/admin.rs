/*
 * Responsibility
 * - GET /admin/metrics: リクエストカウンタ
 * - POST /admin/reset: users 全削除 (cascade で posts/tokens も)、development のみ
 */
use axum::{Json, extract::State};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::{error::AppError, state::AppState};

pub async fn metrics(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "hits": state.hits.get() }))
}

pub async fn reset(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    if state.app_env.is_production() {
        warn!("Reset attempted outside development");
        return Err(AppError::Forbidden);
    }

    let deleted = state.users.reset_users().await?;
    state.hits.reset();

    info!(deleted, "Store reset");
    Ok(Json(json!({ "deleted_users": deleted })))
}
