use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;
use crate::tags::dto::{RenameTagRequest, TagListParams, TagResponse};
use crate::tags::repo;
use crate::users::token::AuthUser;

pub fn tag_routes() -> Router<AppState> {
    Router::new()
        .route("/tags", get(list_tags))
        .route(
            "/tags/:id",
            put(update_tag).patch(update_tag).delete(delete_tag),
        )
}

#[instrument(skip(state))]
pub async fn list_tags(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<TagListParams>,
) -> Result<Json<Vec<TagResponse>>, ApiError> {
    let assigned_only = matches!(params.assigned_only, Some(v) if v != 0);
    let tags = repo::list_for_user(&state.db, user_id, assigned_only).await?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn update_tag(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<RenameTagRequest>,
) -> Result<Json<TagResponse>, ApiError> {
    let tag = repo::rename(&state.db, user_id, id, &payload.name)
        .await?
        .ok_or_else(|| ApiError::NotFound("tag not found".into()))?;
    info!(user_id = %user_id, tag_id = id, "tag renamed");
    Ok(Json(tag.into()))
}

#[instrument(skip(state))]
pub async fn delete_tag(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound("tag not found".into()));
    }
    info!(user_id = %user_id, tag_id = id, "tag deleted");
    Ok(StatusCode::NO_CONTENT)
}
