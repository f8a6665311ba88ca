/// Comment endpoints, nested under their post.
use crate::error::Result;
use crate::handlers::{created, message_only, ok_with_message, paginated, Page};
use crate::middleware::AuthUser;
use crate::models::{CreateCommentRequest, UpdateCommentRequest};
use crate::services::CommentService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ListCommentsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /api/posts/{id}/comments
pub async fn list_comments(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    query: web::Query<ListCommentsQuery>,
) -> Result<HttpResponse> {
    let page = Page::new(query.page, query.limit, 20);

    let service = CommentService::new((**pool).clone());
    let (comments, total) = service.list(*post_id, page.limit, page.offset()).await?;

    Ok(paginated(comments, page.meta(total)))
}

/// POST /api/posts/{id}/comments
pub async fn create_comment(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    user: AuthUser,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    let service = CommentService::new((**pool).clone());
    let comment = service
        .create(*post_id, user.id()?, req.into_inner())
        .await?;

    Ok(created(comment, "Comment created successfully"))
}

/// PUT /api/posts/{id}/comments/{comment_id}
pub async fn update_comment(
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid, Uuid)>,
    user: AuthUser,
    req: web::Json<UpdateCommentRequest>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();

    let service = CommentService::new((**pool).clone());
    let comment = service
        .update(post_id, comment_id, user.id()?, &req.content)
        .await?;

    Ok(ok_with_message(comment, "Comment updated successfully"))
}

/// DELETE /api/posts/{id}/comments/{comment_id}
pub async fn delete_comment(
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid, Uuid)>,
    user: AuthUser,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();

    let service = CommentService::new((**pool).clone());
    service.delete(post_id, comment_id, user.id()?).await?;

    Ok(message_only("Comment deleted successfully"))
}
