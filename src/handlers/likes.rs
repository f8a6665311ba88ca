/// Like endpoints.
use crate::error::Result;
use crate::handlers::{ok, ok_with_message, paginated, Page};
use crate::middleware::{AuthUser, MaybeUser};
use crate::services::LikeService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ListLikesQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// POST /api/posts/{id}/like
pub async fn toggle_like(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    user: AuthUser,
) -> Result<HttpResponse> {
    let service = LikeService::new((**pool).clone());
    let outcome = service.toggle(*post_id, user.id()?).await?;

    let message = if outcome.liked { "Post liked" } else { "Post unliked" };
    Ok(ok_with_message(outcome, message))
}

/// GET /api/posts/{id}/like/status
pub async fn like_status(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    viewer: MaybeUser,
) -> Result<HttpResponse> {
    let service = LikeService::new((**pool).clone());
    let status = service.status(*post_id, viewer.user_id()).await?;

    Ok(ok(status))
}

/// GET /api/posts/{id}/likes
pub async fn list_likes(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    query: web::Query<ListLikesQuery>,
) -> Result<HttpResponse> {
    let page = Page::new(query.page, query.limit, 20);

    let service = LikeService::new((**pool).clone());
    let (likers, total) = service.likers(*post_id, page.limit, page.offset()).await?;

    Ok(paginated(likers, page.meta(total)))
}
