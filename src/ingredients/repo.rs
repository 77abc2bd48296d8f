use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Ingredient {
    pub id: i64,
    pub user_id: Uuid,
    pub name: String,
}

pub async fn list_for_user(
    db: &PgPool,
    user_id: Uuid,
    assigned_only: bool,
) -> anyhow::Result<Vec<Ingredient>> {
    let rows = if assigned_only {
        sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT DISTINCT i.id, i.user_id, i.name
            FROM ingredients i
            JOIN recipe_ingredients ri ON ri.ingredient_id = i.id
            WHERE i.user_id = $1
            ORDER BY i.name DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?
    } else {
        sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT id, user_id, name
            FROM ingredients
            WHERE user_id = $1
            ORDER BY name DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?
    };
    Ok(rows)
}

pub async fn for_recipe(db: &PgPool, recipe_id: i64) -> anyhow::Result<Vec<Ingredient>> {
    let rows = sqlx::query_as::<_, Ingredient>(
        r#"
        SELECT i.id, i.user_id, i.name
        FROM ingredients i
        JOIN recipe_ingredients ri ON ri.ingredient_id = i.id
        WHERE ri.recipe_id = $1
        ORDER BY i.name DESC
        "#,
    )
    .bind(recipe_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn rename(
    db: &PgPool,
    user_id: Uuid,
    id: i64,
    name: &str,
) -> anyhow::Result<Option<Ingredient>> {
    let ingredient = sqlx::query_as::<_, Ingredient>(
        r#"
        UPDATE ingredients
        SET name = $3
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, name
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(name)
    .fetch_optional(db)
    .await?;
    Ok(ingredient)
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: i64) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM ingredients WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Find an ingredient by name in the caller's vocabulary, creating it if
/// absent. Duplicate names are tolerated; the oldest row wins.
pub async fn get_or_create(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    name: &str,
) -> anyhow::Result<Ingredient> {
    if let Some(ingredient) = sqlx::query_as::<_, Ingredient>(
        "SELECT id, user_id, name FROM ingredients WHERE user_id = $1 AND name = $2 ORDER BY id LIMIT 1",
    )
    .bind(user_id)
    .bind(name)
    .fetch_optional(&mut **tx)
    .await?
    {
        return Ok(ingredient);
    }

    let ingredient = sqlx::query_as::<_, Ingredient>(
        "INSERT INTO ingredients (user_id, name) VALUES ($1, $2) RETURNING id, user_id, name",
    )
    .bind(user_id)
    .bind(name)
    .fetch_one(&mut **tx)
    .await?;
    Ok(ingredient)
}
