use crate::models::{AuthorSummary, Like};
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Insert a like for (user, post).
///
/// Returns whether a row was actually inserted. A concurrent toggle that
/// wins the race trips the unique constraint; `ON CONFLICT DO NOTHING`
/// turns that into `false` ("someone already liked it") instead of an
/// error.
pub async fn insert_like(pool: &PgPool, post_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO likes (post_id, user_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, post_id) DO NOTHING
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a like for (user, post); returns whether a row existed
pub async fn delete_like(pool: &PgPool, post_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM likes
        WHERE post_id = $1 AND user_id = $2
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Check whether a user has liked a post
pub async fn find_like(
    pool: &PgPool,
    post_id: Uuid,
    user_id: Uuid,
) -> Result<Option<Like>, sqlx::Error> {
    let like = sqlx::query_as::<_, Like>(
        r#"
        SELECT id, user_id, post_id, created_at
        FROM likes
        WHERE post_id = $1 AND user_id = $2
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(like)
}

/// Count total likes for a post
pub async fn count_by_post(pool: &PgPool, post_id: Uuid) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM likes WHERE post_id = $1")
        .bind(post_id)
        .fetch_one(pool)
        .await?;

    Ok(row.get::<i64, _>("count"))
}

/// Like counts for multiple posts at once
pub async fn count_by_posts(
    pool: &PgPool,
    post_ids: &[Uuid],
) -> Result<Vec<(Uuid, i64)>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT post_id, COUNT(*) as count
        FROM likes
        WHERE post_id = ANY($1)
        GROUP BY post_id
        "#,
    )
    .bind(post_ids)
    .fetch_all(pool)
    .await?;

    let counts = rows
        .into_iter()
        .map(|row| {
            let post_id: Uuid = row.get("post_id");
            let count: i64 = row.get("count");
            (post_id, count)
        })
        .collect();

    Ok(counts)
}

/// Users who liked a post, newest like first
pub async fn list_likers(
    pool: &PgPool,
    post_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<AuthorSummary>, sqlx::Error> {
    let likers = sqlx::query_as::<_, AuthorSummary>(
        r#"
        SELECT u.id, u.username, u.full_name, u.avatar_url
        FROM likes l
        JOIN users u ON l.user_id = u.id
        WHERE l.post_id = $1
        ORDER BY l.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(post_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(likers)
}

/// Most recent likes on a post, for the admin detail view
pub async fn recent_likes(
    pool: &PgPool,
    post_id: Uuid,
    limit: i64,
) -> Result<Vec<Like>, sqlx::Error> {
    let likes = sqlx::query_as::<_, Like>(
        r#"
        SELECT id, user_id, post_id, created_at
        FROM likes
        WHERE post_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(post_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(likes)
}

/// Total like count for the admin dashboard
pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM likes")
        .fetch_one(pool)
        .await?;

    Ok(row.get::<i64, _>("count"))
}
