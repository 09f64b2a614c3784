/*
 * Responsibility
 * - v1 の URL 構造を定義 (/health, /users, /login, /refresh, /revoke, /posts, /webhooks)
 * - admin の URL 構造 (/api の外に置くのでヒット数に数えない)
 * - 認証は route layer ではなく handler ごと (extractor / guard)
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    admin::{metrics, reset},
    auth::{login, refresh, revoke},
    health::health,
    posts::{create_post, delete_post, get_post, list_posts},
    users::{create_user, update_user},
    webhooks::upgrade_user,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/users", post(create_user).put(update_user))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/revoke", post(revoke))
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{post_id}", get(get_post).delete(delete_post))
        .route("/webhooks/upgrade", post(upgrade_user))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/reset", post(reset))
}
