/// Comment threads: one level of nesting, enforced at write time.
use crate::db::{comment_repo, post_repo};
use crate::error::{AppError, Result};
use crate::models::{CommentThread, CommentWithAuthor, CreateCommentRequest};
use crate::policy;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

const MAX_CONTENT_LEN: usize = 1000;

/// Trim and validate comment content.
fn validate_content(content: &str) -> Result<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(
            "Comment content is required".to_string(),
        ));
    }
    if trimmed.len() > MAX_CONTENT_LEN {
        return Err(AppError::Validation(format!(
            "Comment must be less than {} characters",
            MAX_CONTENT_LEN
        )));
    }
    Ok(trimmed.to_string())
}

pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a comment or a reply.
    ///
    /// A reply's parent must exist, belong to the same post (a cross-post
    /// parent is a semantic mismatch, not a missing resource), and be
    /// top-level itself — replies to replies are rejected.
    pub async fn create(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        req: CreateCommentRequest,
    ) -> Result<CommentWithAuthor> {
        let content = validate_content(&req.content)?;

        if post_repo::find_post_by_id(&self.pool, post_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        if let Some(parent_id) = req.parent_id {
            let parent = comment_repo::find_comment_by_id(&self.pool, parent_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Parent comment not found".to_string()))?;

            if parent.post_id != post_id {
                return Err(AppError::Validation(
                    "Parent comment does not belong to this post".to_string(),
                ));
            }

            if parent.is_reply() {
                return Err(AppError::Validation(
                    "Replies cannot be nested more than one level deep".to_string(),
                ));
            }
        }

        let comment =
            comment_repo::create_comment(&self.pool, post_id, author_id, &content, req.parent_id)
                .await?;

        comment_repo::find_comment_with_author(&self.pool, comment.id)
            .await?
            .ok_or_else(|| AppError::Internal("Created comment could not be reloaded".to_string()))
    }

    /// Page of top-level comments, newest first, each with its full reply
    /// list (oldest first). Replies are not separately paginated.
    pub async fn list(
        &self,
        post_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<CommentThread>, i64)> {
        if post_repo::find_post_by_id(&self.pool, post_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        let top_level = comment_repo::list_top_level(&self.pool, post_id, limit, offset).await?;
        let total = comment_repo::count_top_level(&self.pool, post_id).await?;

        let parent_ids: Vec<Uuid> = top_level.iter().map(|c| c.comment.id).collect();
        let mut replies_by_parent: HashMap<Uuid, Vec<CommentWithAuthor>> = HashMap::new();
        for reply in comment_repo::list_replies(&self.pool, &parent_ids).await? {
            if let Some(parent_id) = reply.comment.parent_id {
                replies_by_parent.entry(parent_id).or_default().push(reply);
            }
        }

        let threads = top_level
            .into_iter()
            .map(|comment| {
                let replies = replies_by_parent
                    .remove(&comment.comment.id)
                    .unwrap_or_default();
                CommentThread { comment, replies }
            })
            .collect();

        Ok((threads, total))
    }

    /// Author-only content update.
    pub async fn update(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        actor_id: Uuid,
        content: &str,
    ) -> Result<CommentWithAuthor> {
        let comment = self.find_on_post(post_id, comment_id).await?;

        policy::ensure_owner(actor_id, comment.user_id, "You can only edit your own comments")?;

        let content = validate_content(content)?;

        comment_repo::update_comment(&self.pool, comment_id, &content).await?;

        comment_repo::find_comment_with_author(&self.pool, comment_id)
            .await?
            .ok_or_else(|| AppError::Internal("Updated comment could not be reloaded".to_string()))
    }

    /// Author-only delete, cascading to the comment's direct replies.
    pub async fn delete(&self, post_id: Uuid, comment_id: Uuid, actor_id: Uuid) -> Result<()> {
        let comment = self.find_on_post(post_id, comment_id).await?;

        policy::ensure_owner(
            actor_id,
            comment.user_id,
            "You can only delete your own comments",
        )?;

        comment_repo::delete_comment(&self.pool, comment_id).await?;

        tracing::info!(comment_id = %comment_id, actor_id = %actor_id, "comment deleted");

        Ok(())
    }

    /// Load a comment, treating a post mismatch the same as absence —
    /// comment routes are nested under their post.
    async fn find_on_post(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<crate::models::Comment> {
        let comment = comment_repo::find_comment_by_id(&self.pool, comment_id)
            .await?
            .filter(|c| c.post_id == post_id)
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_is_trimmed() {
        assert_eq!(validate_content("  hello  ").unwrap(), "hello");
    }

    #[test]
    fn test_empty_content_rejected() {
        assert!(validate_content("").is_err());
        assert!(validate_content("   ").is_err());
    }

    #[test]
    fn test_oversized_content_rejected() {
        assert!(validate_content(&"x".repeat(1001)).is_err());
        assert!(validate_content(&"x".repeat(1000)).is_ok());
    }

    #[test]
    fn test_trim_applies_before_length_check() {
        // 1000 content characters padded with whitespace is still valid
        let padded = format!("  {}  ", "x".repeat(1000));
        assert!(validate_content(&padded).is_ok());
    }
}
