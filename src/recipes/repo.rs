use anyhow::Context;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::ingredients::repo as ingredients_repo;
use crate::recipes::filter::RecipeFilters;
use crate::tags::repo as tags_repo;

#[derive(Debug, Clone, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub user_id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub description: String,
    pub link: String,
    pub image_key: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Writable recipe fields. `None` for `tags`/`ingredients` leaves the
/// association sets untouched; `Some` replaces them wholesale.
#[derive(Debug)]
pub struct RecipeInput {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub description: String,
    pub link: String,
    pub tags: Option<Vec<String>>,
    pub ingredients: Option<Vec<String>>,
}

/// Ownership-scoped listing with optional tag/ingredient narrowing:
/// OR within a field, AND across the two fields, join-based and
/// deduplicated, newest id first.
pub async fn list_for_user(
    db: &PgPool,
    user_id: Uuid,
    filters: &RecipeFilters,
) -> anyhow::Result<Vec<Recipe>> {
    let rows = match (&filters.tag_ids, &filters.ingredient_ids) {
        (None, None) => {
            sqlx::query_as::<_, Recipe>(
                r#"
                SELECT id, user_id, title, time_minutes, price, description, link,
                       image_key, created_at, updated_at
                FROM recipes
                WHERE user_id = $1
                ORDER BY id DESC
                "#,
            )
            .bind(user_id)
            .fetch_all(db)
            .await?
        }
        (Some(tag_ids), None) => {
            sqlx::query_as::<_, Recipe>(
                r#"
                SELECT DISTINCT r.id, r.user_id, r.title, r.time_minutes, r.price,
                       r.description, r.link, r.image_key, r.created_at, r.updated_at
                FROM recipes r
                JOIN recipe_tags rt ON rt.recipe_id = r.id
                WHERE r.user_id = $1 AND rt.tag_id = ANY($2)
                ORDER BY r.id DESC
                "#,
            )
            .bind(user_id)
            .bind(tag_ids.as_slice())
            .fetch_all(db)
            .await?
        }
        (None, Some(ingredient_ids)) => {
            sqlx::query_as::<_, Recipe>(
                r#"
                SELECT DISTINCT r.id, r.user_id, r.title, r.time_minutes, r.price,
                       r.description, r.link, r.image_key, r.created_at, r.updated_at
                FROM recipes r
                JOIN recipe_ingredients ri ON ri.recipe_id = r.id
                WHERE r.user_id = $1 AND ri.ingredient_id = ANY($2)
                ORDER BY r.id DESC
                "#,
            )
            .bind(user_id)
            .bind(ingredient_ids.as_slice())
            .fetch_all(db)
            .await?
        }
        (Some(tag_ids), Some(ingredient_ids)) => {
            sqlx::query_as::<_, Recipe>(
                r#"
                SELECT DISTINCT r.id, r.user_id, r.title, r.time_minutes, r.price,
                       r.description, r.link, r.image_key, r.created_at, r.updated_at
                FROM recipes r
                JOIN recipe_tags rt ON rt.recipe_id = r.id
                JOIN recipe_ingredients ri ON ri.recipe_id = r.id
                WHERE r.user_id = $1 AND rt.tag_id = ANY($2) AND ri.ingredient_id = ANY($3)
                ORDER BY r.id DESC
                "#,
            )
            .bind(user_id)
            .bind(tag_ids.as_slice())
            .bind(ingredient_ids.as_slice())
            .fetch_all(db)
            .await?
        }
    };
    Ok(rows)
}

pub async fn find_for_user(db: &PgPool, user_id: Uuid, id: i64) -> anyhow::Result<Option<Recipe>> {
    let recipe = sqlx::query_as::<_, Recipe>(
        r#"
        SELECT id, user_id, title, time_minutes, price, description, link,
               image_key, created_at, updated_at
        FROM recipes
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(recipe)
}

pub async fn create_for_user(
    db: &PgPool,
    user_id: Uuid,
    input: RecipeInput,
) -> anyhow::Result<Recipe> {
    let mut tx = db.begin().await.context("begin tx")?;

    let recipe = sqlx::query_as::<_, Recipe>(
        r#"
        INSERT INTO recipes (user_id, title, time_minutes, price, description, link)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, title, time_minutes, price, description, link,
                  image_key, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(&input.title)
    .bind(input.time_minutes)
    .bind(input.price)
    .bind(&input.description)
    .bind(&input.link)
    .fetch_one(&mut *tx)
    .await?;

    if let Some(names) = &input.tags {
        replace_tag_links(&mut tx, user_id, recipe.id, names).await?;
    }
    if let Some(names) = &input.ingredients {
        replace_ingredient_links(&mut tx, user_id, recipe.id, names).await?;
    }

    tx.commit().await.context("commit tx")?;
    Ok(recipe)
}

/// Ownership-scoped full update; `None` when the row is not the caller's.
pub async fn update_for_user(
    db: &PgPool,
    user_id: Uuid,
    id: i64,
    input: RecipeInput,
) -> anyhow::Result<Option<Recipe>> {
    let mut tx = db.begin().await.context("begin tx")?;

    let Some(recipe) = sqlx::query_as::<_, Recipe>(
        r#"
        UPDATE recipes
        SET title = $3, time_minutes = $4, price = $5, description = $6, link = $7,
            updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, title, time_minutes, price, description, link,
                  image_key, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&input.title)
    .bind(input.time_minutes)
    .bind(input.price)
    .bind(&input.description)
    .bind(&input.link)
    .fetch_optional(&mut *tx)
    .await?
    else {
        return Ok(None);
    };

    if let Some(names) = &input.tags {
        replace_tag_links(&mut tx, user_id, recipe.id, names).await?;
    }
    if let Some(names) = &input.ingredients {
        replace_ingredient_links(&mut tx, user_id, recipe.id, names).await?;
    }

    tx.commit().await.context("commit tx")?;
    Ok(Some(recipe))
}

pub async fn delete_for_user(db: &PgPool, user_id: Uuid, id: i64) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn set_image_key(
    db: &PgPool,
    user_id: Uuid,
    id: i64,
    key: &str,
) -> anyhow::Result<Option<Recipe>> {
    let recipe = sqlx::query_as::<_, Recipe>(
        r#"
        UPDATE recipes
        SET image_key = $3, updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, title, time_minutes, price, description, link,
                  image_key, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(key)
    .fetch_optional(db)
    .await?;
    Ok(recipe)
}

async fn replace_tag_links(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    recipe_id: i64,
    names: &[String],
) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut **tx)
        .await?;

    for name in names {
        let tag = tags_repo::get_or_create(tx, user_id, name).await?;
        sqlx::query(
            "INSERT INTO recipe_tags (recipe_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(recipe_id)
        .bind(tag.id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn replace_ingredient_links(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    recipe_id: i64,
    names: &[String],
) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut **tx)
        .await?;

    for name in names {
        let ingredient = ingredients_repo::get_or_create(tx, user_id, name).await?;
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(recipe_id)
        .bind(ingredient.id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
