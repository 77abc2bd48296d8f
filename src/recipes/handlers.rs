use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::ingredients::repo as ingredients_repo;
use crate::recipes::dto::{
    PatchRecipeRequest, RecipeDetails, RecipeListQuery, RecipeSummary, RecipeWriteRequest,
};
use crate::recipes::filter::RecipeFilters;
use crate::recipes::repo::{self, Recipe, RecipeInput};
use crate::state::AppState;
use crate::tags::repo as tags_repo;
use crate::users::token::AuthUser;

const IMAGE_URL_TTL_SECS: u64 = 30 * 60;
const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/recipes/:id",
            get(get_recipe)
                .put(update_recipe)
                .patch(patch_recipe)
                .delete(delete_recipe),
        )
        .route(
            "/recipes/:id/upload-image",
            post(upload_image).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<RecipeListQuery>,
) -> Result<Json<Vec<RecipeSummary>>, ApiError> {
    let filters = RecipeFilters::from_query(query.tags.as_deref(), query.ingredients.as_deref())?;
    let recipes = repo::list_for_user(&state.db, user_id, &filters).await?;

    let mut items = Vec::with_capacity(recipes.len());
    for recipe in &recipes {
        let tags = tags_repo::for_recipe(&state.db, recipe.id).await?;
        let ingredients = ingredients_repo::for_recipe(&state.db, recipe.id).await?;
        items.push(RecipeSummary::project(recipe, tags, ingredients));
    }
    Ok(Json(items))
}

#[instrument(skip(state, payload))]
pub async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<RecipeWriteRequest>,
) -> Result<(StatusCode, Json<RecipeDetails>), ApiError> {
    let recipe = repo::create_for_user(&state.db, user_id, RecipeInput::from(payload)).await?;
    info!(user_id = %user_id, recipe_id = recipe.id, "recipe created");
    let details = detail_response(&state, &recipe).await?;
    Ok((StatusCode::CREATED, Json(details)))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<RecipeDetails>, ApiError> {
    let recipe = repo::find_for_user(&state.db, user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("recipe not found".into()))?;
    Ok(Json(detail_response(&state, &recipe).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<RecipeWriteRequest>,
) -> Result<Json<RecipeDetails>, ApiError> {
    let recipe = repo::update_for_user(&state.db, user_id, id, RecipeInput::from(payload))
        .await?
        .ok_or_else(|| ApiError::NotFound("recipe not found".into()))?;
    info!(user_id = %user_id, recipe_id = id, "recipe updated");
    Ok(Json(detail_response(&state, &recipe).await?))
}

#[instrument(skip(state, payload))]
pub async fn patch_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<PatchRecipeRequest>,
) -> Result<Json<RecipeDetails>, ApiError> {
    let current = repo::find_for_user(&state.db, user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("recipe not found".into()))?;

    let input = RecipeInput {
        title: payload.title.unwrap_or(current.title),
        time_minutes: payload.time_minutes.unwrap_or(current.time_minutes),
        price: payload.price.unwrap_or(current.price),
        description: payload.description.unwrap_or(current.description),
        link: payload.link.unwrap_or(current.link),
        tags: payload.tags,
        ingredients: payload.ingredients,
    };

    let recipe = repo::update_for_user(&state.db, user_id, id, input)
        .await?
        .ok_or_else(|| ApiError::NotFound("recipe not found".into()))?;
    info!(user_id = %user_id, recipe_id = id, "recipe patched");
    Ok(Json(detail_response(&state, &recipe).await?))
}

#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !repo::delete_for_user(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound("recipe not found".into()));
    }
    info!(user_id = %user_id, recipe_id = id, "recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /recipes/{id}/upload-image (multipart field `image`)
#[instrument(skip(state, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<RecipeDetails>, ApiError> {
    let recipe = repo::find_for_user(&state.db, user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("recipe not found".into()))?;

    let mut upload: Option<Bytes> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().map(|s| s.to_string());
        if name.as_deref() == Some("image") {
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("failed to read image field: {e}")))?;
            upload = Some(data);
        }
    }
    let data = upload.ok_or_else(|| ApiError::Validation("image field is required".into()))?;

    let kind = infer::get(&data)
        .filter(|t| t.matcher_type() == infer::MatcherType::Image)
        .ok_or_else(|| ApiError::Validation("payload is not a valid image".into()))?;

    let key = format!(
        "recipes/{}/{}-{}.{}",
        user_id,
        recipe.id,
        Uuid::new_v4(),
        kind.extension()
    );
    state.storage.put_object(&key, data, kind.mime_type()).await?;

    if let Some(old) = &recipe.image_key {
        if let Err(e) = state.storage.delete_object(old).await {
            warn!(error = %e, key = %old, "failed to delete replaced image");
        }
    }

    let updated = repo::set_image_key(&state.db, user_id, id, &key)
        .await?
        .ok_or_else(|| ApiError::NotFound("recipe not found".into()))?;

    info!(user_id = %user_id, recipe_id = id, key = %key, "image uploaded");
    Ok(Json(detail_response(&state, &updated).await?))
}

async fn detail_response(state: &AppState, recipe: &Recipe) -> Result<RecipeDetails, ApiError> {
    let tags = tags_repo::for_recipe(&state.db, recipe.id).await?;
    let ingredients = ingredients_repo::for_recipe(&state.db, recipe.id).await?;
    let image = match &recipe.image_key {
        Some(key) => Some(state.storage.presign_get(key, IMAGE_URL_TTL_SECS).await?),
        None => None,
    };
    Ok(RecipeDetails::project(recipe, tags, ingredients, image))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_sniffing_accepts_png_and_jpeg_magic() {
        let png = [0x89u8, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0];
        let jpeg = [0xffu8, 0xd8, 0xff, 0xe0, 0, 0, 0, 0];
        assert!(matches!(
            infer::get(&png).map(|t| t.matcher_type()),
            Some(infer::MatcherType::Image)
        ));
        assert!(matches!(
            infer::get(&jpeg).map(|t| t.matcher_type()),
            Some(infer::MatcherType::Image)
        ));
    }

    #[test]
    fn image_sniffing_rejects_non_image_payloads() {
        let text = b"just some text pretending to be an image";
        assert!(!matches!(
            infer::get(text).map(|t| t.matcher_type()),
            Some(infer::MatcherType::Image)
        ));
    }

    #[tokio::test]
    async fn attached_image_key_presigns_to_url() {
        use time::OffsetDateTime;

        let state = crate::state::AppState::fake();
        let recipe = Recipe {
            id: 1,
            user_id: Uuid::new_v4(),
            title: "Chili".into(),
            time_minutes: 30,
            price: "5.50".parse().unwrap(),
            description: String::new(),
            link: String::new(),
            image_key: Some("recipes/u/1-img.png".into()),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };

        // the fake store echoes the key back in the URL
        let image = match &recipe.image_key {
            Some(key) => Some(
                state
                    .storage
                    .presign_get(key, IMAGE_URL_TTL_SECS)
                    .await
                    .unwrap(),
            ),
            None => None,
        };
        assert_eq!(
            image.as_deref(),
            Some("https://fake.local/recipes/u/1-img.png")
        );
    }
}
