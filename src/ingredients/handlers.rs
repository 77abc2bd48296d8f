use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::ingredients::dto::{IngredientListParams, IngredientResponse, RenameIngredientRequest};
use crate::ingredients::repo;
use crate::state::AppState;
use crate::users::token::AuthUser;

pub fn ingredient_routes() -> Router<AppState> {
    Router::new()
        .route("/ingredients", get(list_ingredients))
        .route(
            "/ingredients/:id",
            put(update_ingredient)
                .patch(update_ingredient)
                .delete(delete_ingredient),
        )
}

#[instrument(skip(state))]
pub async fn list_ingredients(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<IngredientListParams>,
) -> Result<Json<Vec<IngredientResponse>>, ApiError> {
    let assigned_only = matches!(params.assigned_only, Some(v) if v != 0);
    let ingredients = repo::list_for_user(&state.db, user_id, assigned_only).await?;
    Ok(Json(
        ingredients
            .into_iter()
            .map(IngredientResponse::from)
            .collect(),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_ingredient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<RenameIngredientRequest>,
) -> Result<Json<IngredientResponse>, ApiError> {
    let ingredient = repo::rename(&state.db, user_id, id, &payload.name)
        .await?
        .ok_or_else(|| ApiError::NotFound("ingredient not found".into()))?;
    info!(user_id = %user_id, ingredient_id = id, "ingredient renamed");
    Ok(Json(ingredient.into()))
}

#[instrument(skip(state))]
pub async fn delete_ingredient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound("ingredient not found".into()));
    }
    info!(user_id = %user_id, ingredient_id = id, "ingredient deleted");
    Ok(StatusCode::NO_CONTENT)
}
