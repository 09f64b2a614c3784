/*
 * Responsibility
 * - v1 の公開面 (routes() / admin_routes() の re-export)
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::{admin_routes, routes};
