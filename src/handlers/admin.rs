/// Admin dashboard endpoints. The whole scope sits behind the mandatory
/// auth gate plus the admin gate; handlers only thread the acting
/// admin's identity through for the self-protection rules.
use crate::error::Result;
use crate::handlers::{message_only, ok, ok_with_message, paginated, Page};
use crate::middleware::AuthUser;
use crate::models::{AdminUserPatch, PostPatch};
use crate::services::AdminService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

const ADMIN_PAGE_SIZE: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct AdminUsersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdminPostsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub search: Option<String>,
}

/// GET /api/admin/users
pub async fn list_users(
    pool: web::Data<PgPool>,
    query: web::Query<AdminUsersQuery>,
) -> Result<HttpResponse> {
    let page = Page::new(query.page, query.limit, ADMIN_PAGE_SIZE);

    let service = AdminService::new((**pool).clone());
    let (users, total) = service
        .list_users(query.search.as_deref(), page.limit, page.offset())
        .await?;

    Ok(paginated(users, page.meta(total)))
}

/// GET /api/admin/users/{id}
pub async fn get_user(pool: web::Data<PgPool>, user_id: web::Path<Uuid>) -> Result<HttpResponse> {
    let service = AdminService::new((**pool).clone());
    let detail = service.get_user(*user_id).await?;

    Ok(ok(detail))
}

/// PUT /api/admin/users/{id}
pub async fn update_user(
    pool: web::Data<PgPool>,
    user_id: web::Path<Uuid>,
    admin: AuthUser,
    patch: web::Json<AdminUserPatch>,
) -> Result<HttpResponse> {
    let service = AdminService::new((**pool).clone());
    let updated = service
        .update_user(admin.id()?, *user_id, patch.into_inner())
        .await?;

    Ok(ok_with_message(updated, "User updated successfully"))
}

/// DELETE /api/admin/users/{id}
pub async fn delete_user(
    pool: web::Data<PgPool>,
    user_id: web::Path<Uuid>,
    admin: AuthUser,
) -> Result<HttpResponse> {
    let service = AdminService::new((**pool).clone());
    service.delete_user(admin.id()?, *user_id).await?;

    Ok(message_only("User deleted successfully"))
}

/// GET /api/admin/posts
pub async fn list_posts(
    pool: web::Data<PgPool>,
    query: web::Query<AdminPostsQuery>,
) -> Result<HttpResponse> {
    let page = Page::new(query.page, query.limit, ADMIN_PAGE_SIZE);

    let service = AdminService::new((**pool).clone());
    let (posts, total) = service
        .list_posts(
            query.status.as_deref(),
            query.search.as_deref(),
            page.limit,
            page.offset(),
        )
        .await?;

    Ok(paginated(posts, page.meta(total)))
}

/// GET /api/admin/posts/{id}
pub async fn get_post(pool: web::Data<PgPool>, post_id: web::Path<Uuid>) -> Result<HttpResponse> {
    let service = AdminService::new((**pool).clone());
    let detail = service.get_post(*post_id).await?;

    Ok(ok(detail))
}

/// PUT /api/admin/posts/{id}
pub async fn update_post(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    patch: web::Json<PostPatch>,
) -> Result<HttpResponse> {
    let service = AdminService::new((**pool).clone());
    let updated = service.update_post(*post_id, patch.into_inner()).await?;

    Ok(ok_with_message(updated, "Post updated successfully"))
}

/// DELETE /api/admin/posts/{id}
pub async fn delete_post(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    admin: AuthUser,
) -> Result<HttpResponse> {
    let service = AdminService::new((**pool).clone());
    service.delete_post(admin.id()?, *post_id).await?;

    Ok(message_only("Post deleted successfully"))
}

/// GET /api/admin/stats
pub async fn stats(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let service = AdminService::new((**pool).clone());
    let stats = service.stats().await?;

    Ok(ok(stats))
}
