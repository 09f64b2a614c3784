/*
 * Responsibility
 * - 決済プロバイダからの POST /webhooks/upgrade
 * - WEBHOOK_API_KEY 設定時は `Authorization: ApiKey <key>` で認証
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use tracing::{debug, info, warn};

use crate::{
    api::v1::dto::webhooks::{USER_UPGRADED, WebhookRequest},
    error::AppError,
    services::auth::bearer,
    state::AppState,
};

const API_KEY_SCHEME: &str = "ApiKey";

pub async fn upgrade_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<WebhookRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    if let Some(expected) = state.webhook_api_key.as_deref() {
        let presented = bearer::authorization(&headers)
            .and_then(|h| bearer::extract_scheme(h, API_KEY_SCHEME))
            .map_err(|e| {
                warn!(error = %e, "Webhook without a usable api key");
                AppError::Unauthorized
            })?;
        if presented != expected {
            warn!("Webhook with wrong api key");
            return Err(AppError::Unauthorized);
        }
    }

    let Json(req) = payload?;

    if req.event != USER_UPGRADED {
        debug!(event = %req.event, "Ignoring webhook event");
        return Ok(StatusCode::NO_CONTENT);
    }

    if !state.users.upgrade_user(req.data.user_id).await? {
        return Err(AppError::not_found("user"));
    }

    info!(user_id = %req.data.user_id, "User upgraded");
    Ok(StatusCode::NO_CONTENT)
}
