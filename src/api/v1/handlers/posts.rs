/*
 * Responsibility
 * - /posts 系 handler
 * - 参照系の {post_id} は公開 ID → extractor で内部 ID に変換して受け取る
 * - DELETE は認証 → ID 復号 → 所有者チェックの順 (認証前に ID の正否を返さない)
 */
use axum::{
    Json,
    extract::{Path, Query, State, rejection::{JsonRejection, QueryRejection}},
    http::{HeaderMap, StatusCode},
};
use tracing::info;

use crate::{
    api::v1::{
        dto::posts::{CreatePostRequest, ListPostsQuery, PostResponse},
        extractors::{AuthCtxExtractor, public_id::PublicPostId},
    },
    error::AppError,
    repos::PostRow,
    services::auth::{AuthError, bearer},
    state::AppState,
};

fn row_to_response(state: &AppState, row: PostRow) -> Result<PostResponse, AppError> {
    Ok(PostResponse {
        id: state.id_codec.encode(row.id)?,
        body: row.body,
        author_id: row.author_id,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub async fn list_posts(
    State(state): State<AppState>,
    query: Result<Query<ListPostsQuery>, QueryRejection>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let Query(query) = query?;

    let rows = state
        .posts
        .list_posts(query.author_id, query.sort.into())
        .await?;

    let res = rows
        .into_iter()
        .map(|row| row_to_response(&state, row))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(res))
}

pub async fn create_post(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PostResponse>), AppError> {
    let Json(req) = payload?;
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_POST", msg))?;

    let row = state.posts.create_post(&req.body, ctx.user_id).await?;

    Ok((StatusCode::CREATED, Json(row_to_response(&state, row)?)))
}

pub async fn get_post(
    State(state): State<AppState>,
    post_id: PublicPostId,
) -> Result<Json<PostResponse>, AppError> {
    let row = state
        .posts
        .get_post(post_id.id)
        .await?
        .ok_or(AppError::not_found("post"))?;

    Ok(Json(row_to_response(&state, row)?))
}

pub async fn delete_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(public_id): Path<String>,
) -> Result<StatusCode, AppError> {
    // authenticate before decoding so an anonymous caller learns nothing about the id
    let header = bearer::authorization(&headers).map_err(AuthError::from)?;
    let caller = state.guard.authenticate(header)?;

    let post_id = state.id_codec.decode(&public_id)?;
    state
        .guard
        .check_owner(caller, state.posts.as_ref(), post_id)
        .await?;

    // a concurrent delete between the guard and here is just a 404
    if !state.posts.delete_post(post_id).await? {
        return Err(AppError::not_found("post"));
    }

    info!(user_id = %caller, post_id, "Post deleted");
    Ok(StatusCode::NO_CONTENT)
}
