//! Request counter.
//!
//! Counts every request routed under `/api`; the admin metrics endpoint reads it.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::state::AppState;

pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, count_hits))
}

async fn count_hits(State(state): State<AppState>, req: Request<Body>, next: Next) -> Response {
    state.hits.incr();
    next.run(req).await
}
