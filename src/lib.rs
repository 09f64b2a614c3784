//! Multi-user content API: accounts, posts, and the credential/session layer
//! (password hashing, bearer extraction, access/refresh tokens, ownership guard).

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
