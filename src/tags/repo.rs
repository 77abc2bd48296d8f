use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Tag {
    pub id: i64,
    pub user_id: Uuid,
    pub name: String,
}

/// List the caller's tags, newest name first. With `assigned_only`, keep
/// only tags linked to at least one recipe, deduplicated.
pub async fn list_for_user(
    db: &PgPool,
    user_id: Uuid,
    assigned_only: bool,
) -> anyhow::Result<Vec<Tag>> {
    let rows = if assigned_only {
        sqlx::query_as::<_, Tag>(
            r#"
            SELECT DISTINCT t.id, t.user_id, t.name
            FROM tags t
            JOIN recipe_tags rt ON rt.tag_id = t.id
            WHERE t.user_id = $1
            ORDER BY t.name DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?
    } else {
        sqlx::query_as::<_, Tag>(
            r#"
            SELECT id, user_id, name
            FROM tags
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

pub async fn for_recipe(db: &PgPool, recipe_id: i64) -> anyhow::Result<Vec<Tag>> {
    let rows = sqlx::query_as::<_, Tag>(
        r#"
        SELECT t.id, t.user_id, t.name
        FROM tags t
        JOIN recipe_tags rt ON rt.tag_id = t.id
        WHERE rt.recipe_id = $1
        ORDER BY t.name DESC
        "#,
    )
    .bind(recipe_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Ownership-scoped rename; `None` when the row is not the caller's.
pub async fn rename(
    db: &PgPool,
    user_id: Uuid,
    id: i64,
    name: &str,
) -> anyhow::Result<Option<Tag>> {
    let tag = sqlx::query_as::<_, Tag>(
        r#"
        UPDATE tags
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
    Ok(tag)
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: i64) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM tags WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Find a tag by name in the caller's vocabulary, creating it if absent.
/// Duplicate names are tolerated; the oldest row wins.
pub async fn get_or_create(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    name: &str,
) -> anyhow::Result<Tag> {
    if let Some(tag) = sqlx::query_as::<_, Tag>(
        "SELECT id, user_id, name FROM tags WHERE user_id = $1 AND name = $2 ORDER BY id LIMIT 1",
    )
    .bind(user_id)
    .bind(name)
    .fetch_optional(&mut **tx)
    .await?
    {
        return Ok(tag);
    }

    let tag = sqlx::query_as::<_, Tag>(
        "INSERT INTO tags (user_id, name) VALUES ($1, $2) RETURNING id, user_id, name",
    )
    .bind(user_id)
    .bind(name)
    .fetch_one(&mut **tx)
    .await?;
    Ok(tag)
}
