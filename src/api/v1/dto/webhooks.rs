/*
 * Responsibility
 * - 決済プロバイダからの webhook payload
 */
use serde::Deserialize;
use uuid::Uuid;

pub const USER_UPGRADED: &str = "user.upgraded";

#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    pub event: String,
    pub data: WebhookData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookData {
    pub user_id: Uuid,
}
