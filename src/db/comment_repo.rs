use crate::models::{AuthorSummary, Comment, CommentWithAuthor};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

const COMMENT_COLUMNS: &str = "id, post_id, user_id, content, parent_id, created_at, updated_at";

const COMMENT_AUTHOR_COLUMNS: &str =
    "c.id, c.post_id, c.user_id, c.content, c.parent_id, c.created_at, c.updated_at, \
     u.id as author_id, u.username as author_username, u.full_name as author_full_name, \
     u.avatar_url as author_avatar_url";

fn comment_with_author_from_row(row: &PgRow) -> CommentWithAuthor {
    CommentWithAuthor {
        comment: Comment {
            id: row.get("id"),
            post_id: row.get("post_id"),
            user_id: row.get("user_id"),
            content: row.get("content"),
            parent_id: row.get("parent_id"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        },
        author: AuthorSummary {
            id: row.get("author_id"),
            username: row.get("author_username"),
            full_name: row.get("author_full_name"),
            avatar_url: row.get("author_avatar_url"),
        },
    }
}

/// Create a new comment
pub async fn create_comment(
    pool: &PgPool,
    post_id: Uuid,
    user_id: Uuid,
    content: &str,
    parent_id: Option<Uuid>,
) -> Result<Comment, sqlx::Error> {
    let comment = sqlx::query_as::<_, Comment>(&format!(
        r#"
        INSERT INTO comments (post_id, user_id, content, parent_id)
        VALUES ($1, $2, $3, $4)
        RETURNING {COMMENT_COLUMNS}
        "#
    ))
    .bind(post_id)
    .bind(user_id)
    .bind(content)
    .bind(parent_id)
    .fetch_one(pool)
    .await?;

    Ok(comment)
}

/// Find a comment by ID
pub async fn find_comment_by_id(
    pool: &PgPool,
    comment_id: Uuid,
) -> Result<Option<Comment>, sqlx::Error> {
    let comment = sqlx::query_as::<_, Comment>(&format!(
        "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
    ))
    .bind(comment_id)
    .fetch_optional(pool)
    .await?;

    Ok(comment)
}

/// Find a comment joined with its author summary
pub async fn find_comment_with_author(
    pool: &PgPool,
    comment_id: Uuid,
) -> Result<Option<CommentWithAuthor>, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        SELECT {COMMENT_AUTHOR_COLUMNS}
        FROM comments c
        JOIN users u ON c.user_id = u.id
        WHERE c.id = $1
        "#
    ))
    .bind(comment_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(comment_with_author_from_row))
}

/// Page of top-level comments for a post, newest first
pub async fn list_top_level(
    pool: &PgPool,
    post_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {COMMENT_AUTHOR_COLUMNS}
        FROM comments c
        JOIN users u ON c.user_id = u.id
        WHERE c.post_id = $1 AND c.parent_id IS NULL
        ORDER BY c.created_at DESC
        LIMIT $2 OFFSET $3
        "#
    ))
    .bind(post_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(comment_with_author_from_row).collect())
}

/// Count top-level comments for a post (pagination total)
pub async fn count_top_level(pool: &PgPool, post_id: Uuid) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        "SELECT COUNT(*) as count FROM comments WHERE post_id = $1 AND parent_id IS NULL",
    )
    .bind(post_id)
    .fetch_one(pool)
    .await?;

    Ok(row.get::<i64, _>("count"))
}

/// Replies for a set of parent comments, oldest first within each parent
pub async fn list_replies(
    pool: &PgPool,
    parent_ids: &[Uuid],
) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {COMMENT_AUTHOR_COLUMNS}
        FROM comments c
        JOIN users u ON c.user_id = u.id
        WHERE c.parent_id = ANY($1)
        ORDER BY c.created_at ASC
        "#
    ))
    .bind(parent_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(comment_with_author_from_row).collect())
}

/// Update comment content
pub async fn update_comment(
    pool: &PgPool,
    comment_id: Uuid,
    content: &str,
) -> Result<Comment, sqlx::Error> {
    let comment = sqlx::query_as::<_, Comment>(&format!(
        r#"
        UPDATE comments
        SET content = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING {COMMENT_COLUMNS}
        "#
    ))
    .bind(comment_id)
    .bind(content)
    .fetch_one(pool)
    .await?;

    Ok(comment)
}

/// Delete a comment and its direct replies in one transaction, replies
/// first.
pub async fn delete_comment(pool: &PgPool, comment_id: Uuid) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM comments WHERE parent_id = $1")
        .bind(comment_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(())
}

/// Count all comments on a post, replies included
pub async fn count_by_post(pool: &PgPool, post_id: Uuid) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM comments WHERE post_id = $1")
        .bind(post_id)
        .fetch_one(pool)
        .await?;

    Ok(row.get::<i64, _>("count"))
}

/// Comment counts for multiple posts at once
pub async fn count_by_posts(
    pool: &PgPool,
    post_ids: &[Uuid],
) -> Result<Vec<(Uuid, i64)>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT post_id, COUNT(*) as count
        FROM comments
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

/// Most recent comments on a post, for the admin detail view
pub async fn recent_comments(
    pool: &PgPool,
    post_id: Uuid,
    limit: i64,
) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {COMMENT_AUTHOR_COLUMNS}
        FROM comments c
        JOIN users u ON c.user_id = u.id
        WHERE c.post_id = $1
        ORDER BY c.created_at DESC
        LIMIT $2
        "#
    ))
    .bind(post_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(comment_with_author_from_row).collect())
}

/// Total comment count for the admin dashboard
pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM comments")
        .fetch_one(pool)
        .await?;

    Ok(row.get::<i64, _>("count"))
}
