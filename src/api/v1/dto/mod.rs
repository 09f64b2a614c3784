pub mod auth;
pub mod posts;
pub mod users;
pub mod webhooks;
