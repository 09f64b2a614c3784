/*
 * Responsibility
 * - v1 handler 共通の request → 型付き値 の変換
 */
pub mod auth_ctx;
pub mod bearer_token;
pub mod public_id;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor};
pub use bearer_token::BearerToken;
