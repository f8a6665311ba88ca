/// User profile endpoints.
use crate::error::Result;
use crate::handlers::{message_only, ok, ok_with_message, paginated, Page};
use crate::middleware::{AuthUser, MaybeUser};
use crate::models::{ChangePasswordRequest, ProfilePatch};
use crate::services::{PostService, UserService};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct UserPostsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
}

/// GET /api/users/{id}
pub async fn get_user(pool: web::Data<PgPool>, user_id: web::Path<Uuid>) -> Result<HttpResponse> {
    let service = UserService::new((**pool).clone());
    let profile = service.get_profile(*user_id).await?;

    Ok(ok(profile))
}

/// PUT /api/users/{id}
pub async fn update_profile(
    pool: web::Data<PgPool>,
    user_id: web::Path<Uuid>,
    user: AuthUser,
    patch: web::Json<ProfilePatch>,
) -> Result<HttpResponse> {
    let service = UserService::new((**pool).clone());
    let updated = service
        .update_profile(user.id()?, *user_id, patch.into_inner())
        .await?;

    Ok(ok_with_message(updated, "Profile updated successfully"))
}

/// PUT /api/users/{id}/password
pub async fn change_password(
    pool: web::Data<PgPool>,
    user_id: web::Path<Uuid>,
    user: AuthUser,
    req: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse> {
    let service = UserService::new((**pool).clone());
    service
        .change_password(user.id()?, *user_id, req.into_inner())
        .await?;

    Ok(message_only("Password changed successfully"))
}

/// GET /api/users/{id}/posts
pub async fn list_user_posts(
    pool: web::Data<PgPool>,
    user_id: web::Path<Uuid>,
    viewer: MaybeUser,
    query: web::Query<UserPostsQuery>,
) -> Result<HttpResponse> {
    let page = Page::new(query.page, query.limit, 10);

    let service = PostService::new((**pool).clone());
    let (posts, total) = service
        .list_by_user(
            *user_id,
            viewer.user_id(),
            viewer.is_admin(),
            query.status.as_deref(),
            page.limit,
            page.offset(),
        )
        .await?;

    Ok(paginated(posts, page.meta(total)))
}
