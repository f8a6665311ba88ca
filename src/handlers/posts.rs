/// Post endpoints.
use crate::error::Result;
use crate::handlers::{created, message_only, ok, ok_with_message, paginated, Page};
use crate::middleware::{AuthUser, MaybeUser};
use crate::models::{CreatePostRequest, PostPatch, PostSort};
use crate::services::PostService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub sort: Option<String>,
    pub search: Option<String>,
}

/// GET /api/posts
pub async fn list_posts(
    pool: web::Data<PgPool>,
    viewer: MaybeUser,
    query: web::Query<ListPostsQuery>,
) -> Result<HttpResponse> {
    let page = Page::new(query.page, query.limit, 10);

    let service = PostService::new((**pool).clone());
    let (posts, total) = service
        .list(
            viewer.is_admin(),
            query.status.as_deref(),
            PostSort::parse(query.sort.as_deref()),
            query.search.as_deref(),
            page.limit,
            page.offset(),
        )
        .await?;

    Ok(paginated(posts, page.meta(total)))
}

/// POST /api/posts
pub async fn create_post(
    pool: web::Data<PgPool>,
    user: AuthUser,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let post = service.create(user.id()?, req.into_inner()).await?;

    Ok(created(post, "Post created successfully"))
}

/// GET /api/posts/{id}
pub async fn get_post(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    viewer: MaybeUser,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let post = service.get(*post_id, viewer.user_id()).await?;

    Ok(ok(post))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    user: AuthUser,
    patch: web::Json<PostPatch>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let post = service
        .update(*post_id, user.id()?, patch.into_inner())
        .await?;

    Ok(ok_with_message(post, "Post updated successfully"))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    user: AuthUser,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    service.delete(*post_id, user.id()?).await?;

    Ok(message_only("Post deleted successfully"))
}
