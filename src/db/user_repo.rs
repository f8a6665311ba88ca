use crate::models::{AdminUserPatch, ProfilePatch, User};
use sqlx::{PgPool, Row};
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, full_name, bio, avatar_url, role, is_banned, \
     created_at, updated_at";

/// Find a user by ID
pub async fn find_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Find a user by username
pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Find a user by email
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Create a new user with the default role
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
    full_name: Option<&str>,
) -> Result<User, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (username, email, password_hash, full_name)
        VALUES ($1, $2, $3, $4)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(full_name)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Apply a profile patch; absent fields keep their current value
pub async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    patch: &ProfilePatch,
) -> Result<User, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users SET
            full_name = COALESCE($2, full_name),
            bio = COALESCE($3, bio),
            avatar_url = COALESCE($4, avatar_url),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(patch.full_name.as_deref())
    .bind(patch.bio.as_deref())
    .bind(patch.avatar_url.as_deref())
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Replace the stored password hash
pub async fn update_password(
    pool: &PgPool,
    user_id: Uuid,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE users
        SET password_hash = $2, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(password_hash)
    .execute(pool)
    .await?;

    Ok(())
}

/// Apply an admin moderation patch (role and/or ban flag)
pub async fn apply_admin_patch(
    pool: &PgPool,
    user_id: Uuid,
    patch: &AdminUserPatch,
) -> Result<User, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users SET
            role = COALESCE($2, role),
            is_banned = COALESCE($3, is_banned),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(patch.role)
    .bind(patch.is_banned)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// List users for the admin dashboard, optionally filtered by a search
/// term across username, email, and full name
pub async fn list_users(
    pool: &PgPool,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<User>, sqlx::Error> {
    let users = sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE ($1::text IS NULL
               OR username ILIKE '%' || $1 || '%'
               OR email ILIKE '%' || $1 || '%'
               OR full_name ILIKE '%' || $1 || '%')
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#
    ))
    .bind(search)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Count users matching the admin search filter
pub async fn count_users(pool: &PgPool, search: Option<&str>) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) as count
        FROM users
        WHERE ($1::text IS NULL
               OR username ILIKE '%' || $1 || '%'
               OR email ILIKE '%' || $1 || '%'
               OR full_name ILIKE '%' || $1 || '%')
        "#,
    )
    .bind(search)
    .fetch_one(pool)
    .await?;

    Ok(row.get::<i64, _>("count"))
}

/// Delete a user and everything that references them.
///
/// Runs as a single transaction: the user's likes, likes on their posts,
/// comments on their posts, replies to their comments, their comments,
/// their posts, then the user row. Child rows go first so the sequence is
/// valid even without cascading foreign keys.
pub async fn delete_user(pool: &PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        DELETE FROM likes
        WHERE user_id = $1
           OR post_id IN (SELECT id FROM posts WHERE user_id = $1)
        "#,
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        DELETE FROM comments
        WHERE post_id IN (SELECT id FROM posts WHERE user_id = $1)
        "#,
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        DELETE FROM comments
        WHERE parent_id IN (SELECT id FROM comments WHERE user_id = $1)
        "#,
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM comments WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM posts WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(())
}

/// User totals for the admin dashboard
pub async fn user_stats(pool: &PgPool) -> Result<(i64, i64, i64), sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) as total,
               COUNT(*) FILTER (WHERE role = 'admin') as admins,
               COUNT(*) FILTER (WHERE is_banned) as banned
        FROM users
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok((
        row.get::<i64, _>("total"),
        row.get::<i64, _>("admins"),
        row.get::<i64, _>("banned"),
    ))
}
