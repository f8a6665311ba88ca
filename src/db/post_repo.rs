use crate::models::{AuthorSummary, Post, PostPatch, PostSort, PostStatus, PostSummary, PostWithAuthor};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

const POST_COLUMNS: &str =
    "id, user_id, title, content, excerpt, featured_image, status, views_count, published_at, \
     created_at, updated_at";

// Prefixed variant plus aliased author columns for joined queries.
const POST_AUTHOR_COLUMNS: &str =
    "p.id, p.user_id, p.title, p.content, p.excerpt, p.featured_image, p.status, p.views_count, \
     p.published_at, p.created_at, p.updated_at, \
     u.id as author_id, u.username as author_username, u.full_name as author_full_name, \
     u.avatar_url as author_avatar_url";

fn post_with_author_from_row(row: &PgRow) -> PostWithAuthor {
    PostWithAuthor {
        post: Post {
            id: row.get("id"),
            user_id: row.get("user_id"),
            title: row.get("title"),
            content: row.get("content"),
            excerpt: row.get("excerpt"),
            featured_image: row.get("featured_image"),
            status: row.get("status"),
            views_count: row.get("views_count"),
            published_at: row.get("published_at"),
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

/// Create a new post. A post created directly as published gets its
/// `published_at` stamped immediately.
pub async fn create_post(
    pool: &PgPool,
    user_id: Uuid,
    title: &str,
    content: &str,
    excerpt: &str,
    featured_image: Option<&str>,
    status: PostStatus,
) -> Result<Post, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(&format!(
        r#"
        INSERT INTO posts (user_id, title, content, excerpt, featured_image, status, published_at)
        VALUES (
            $1, $2, $3, $4, $5, $6,
            CASE WHEN $6::post_status = 'published'::post_status THEN NOW() ELSE NULL END
        )
        RETURNING {POST_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(title)
    .bind(content)
    .bind(excerpt)
    .bind(featured_image)
    .bind(status)
    .fetch_one(pool)
    .await?;

    Ok(post)
}

/// Find a post by ID
pub async fn find_post_by_id(pool: &PgPool, post_id: Uuid) -> Result<Option<Post>, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(&format!(
        "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
    ))
    .bind(post_id)
    .fetch_optional(pool)
    .await?;

    Ok(post)
}

/// Find a post joined with its author summary
pub async fn find_post_with_author(
    pool: &PgPool,
    post_id: Uuid,
) -> Result<Option<PostWithAuthor>, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        SELECT {POST_AUTHOR_COLUMNS}
        FROM posts p
        JOIN users u ON p.user_id = u.id
        WHERE p.id = $1
        "#
    ))
    .bind(post_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(post_with_author_from_row))
}

/// Increment the view counter. Fires on every detail fetch, including the
/// author's own; views are not deduplicated per viewer.
pub async fn increment_views(pool: &PgPool, post_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE posts SET views_count = views_count + 1 WHERE id = $1")
        .bind(post_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// List posts with author summaries, filtered by status and a free-text
/// search across title and content
pub async fn list_posts(
    pool: &PgPool,
    status: Option<PostStatus>,
    search: Option<&str>,
    sort: PostSort,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostWithAuthor>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {POST_AUTHOR_COLUMNS}
        FROM posts p
        JOIN users u ON p.user_id = u.id
        WHERE ($1::post_status IS NULL OR p.status = $1)
          AND ($2::text IS NULL
               OR p.title ILIKE '%' || $2 || '%'
               OR p.content ILIKE '%' || $2 || '%')
        ORDER BY {order}
        LIMIT $3 OFFSET $4
        "#,
        order = sort.order_clause()
    ))
    .bind(status)
    .bind(search)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(post_with_author_from_row).collect())
}

/// Count posts matching the listing filters
pub async fn count_posts(
    pool: &PgPool,
    status: Option<PostStatus>,
    search: Option<&str>,
) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) as count
        FROM posts p
        WHERE ($1::post_status IS NULL OR p.status = $1)
          AND ($2::text IS NULL
               OR p.title ILIKE '%' || $2 || '%'
               OR p.content ILIKE '%' || $2 || '%')
        "#,
    )
    .bind(status)
    .bind(search)
    .fetch_one(pool)
    .await?;

    Ok(row.get::<i64, _>("count"))
}

/// List one author's posts, newest first
pub async fn list_posts_by_user(
    pool: &PgPool,
    user_id: Uuid,
    status: Option<PostStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Post>, sqlx::Error> {
    let posts = sqlx::query_as::<_, Post>(&format!(
        r#"
        SELECT {POST_COLUMNS}
        FROM posts
        WHERE user_id = $1
          AND ($2::post_status IS NULL OR status = $2)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#
    ))
    .bind(user_id)
    .bind(status)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(posts)
}

/// Count one author's posts
pub async fn count_posts_by_user(
    pool: &PgPool,
    user_id: Uuid,
    status: Option<PostStatus>,
) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) as count
        FROM posts
        WHERE user_id = $1
          AND ($2::post_status IS NULL OR status = $2)
        "#,
    )
    .bind(user_id)
    .bind(status)
    .fetch_one(pool)
    .await?;

    Ok(row.get::<i64, _>("count"))
}

/// Compact recent-post projections for profile and admin detail views
pub async fn recent_posts_by_user(
    pool: &PgPool,
    user_id: Uuid,
    status: Option<PostStatus>,
    limit: i64,
) -> Result<Vec<PostSummary>, sqlx::Error> {
    let posts = sqlx::query_as::<_, PostSummary>(
        r#"
        SELECT id, title, excerpt, status, views_count, created_at
        FROM posts
        WHERE user_id = $1
          AND ($2::post_status IS NULL OR status = $2)
        ORDER BY created_at DESC
        LIMIT $3
        "#,
    )
    .bind(user_id)
    .bind(status)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(posts)
}

/// Apply a post patch; absent fields keep their current value.
///
/// The first transition into `published` stamps `published_at`; later
/// transitions never touch it, so publish history survives unpublishing.
pub async fn update_post(
    pool: &PgPool,
    post_id: Uuid,
    patch: &PostPatch,
) -> Result<Post, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(&format!(
        r#"
        UPDATE posts SET
            title = COALESCE($2, title),
            content = COALESCE($3, content),
            excerpt = COALESCE($4, excerpt),
            featured_image = COALESCE($5, featured_image),
            status = COALESCE($6, status),
            published_at = CASE
                WHEN $6::post_status = 'published'::post_status AND published_at IS NULL
                THEN NOW()
                ELSE published_at
            END,
            updated_at = NOW()
        WHERE id = $1
        RETURNING {POST_COLUMNS}
        "#
    ))
    .bind(post_id)
    .bind(patch.title.as_deref())
    .bind(patch.content.as_deref())
    .bind(patch.excerpt.as_deref())
    .bind(patch.featured_image.as_deref())
    .bind(patch.status)
    .fetch_one(pool)
    .await?;

    Ok(post)
}

/// Delete a post and everything that references it, in one transaction:
/// comments first, then likes, then the post row.
pub async fn delete_post(pool: &PgPool, post_id: Uuid) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM comments WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM likes WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(())
}

/// Post totals for the admin dashboard
pub async fn post_stats(pool: &PgPool) -> Result<(i64, i64, i64), sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) as total,
               COUNT(*) FILTER (WHERE status = 'published') as published,
               COUNT(*) FILTER (WHERE status = 'draft') as draft
        FROM posts
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok((
        row.get::<i64, _>("total"),
        row.get::<i64, _>("published"),
        row.get::<i64, _>("draft"),
    ))
}
