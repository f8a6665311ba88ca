/// Post lifecycle: creation, the draft/published state machine, listing,
/// partial updates, and cascading deletion.
use crate::db::{comment_repo, like_repo, post_repo, user_repo};
use crate::error::{AppError, Result};
use crate::models::{
    CreatePostRequest, Post, PostDetail, PostListItem, PostPatch, PostSort, PostStatus,
    PostWithAuthor,
};
use crate::policy;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

const MAX_TITLE_LEN: usize = 255;
const MAX_EXCERPT_LEN: usize = 500;

/// First 500 characters of the content, on a char boundary.
pub fn derive_excerpt(content: &str) -> String {
    content.chars().take(MAX_EXCERPT_LEN).collect()
}

/// Resolve a `status` query parameter. `all` means no filter; anything
/// unrecognized is rejected rather than silently matching nothing.
pub fn parse_status_filter(value: Option<&str>) -> Result<Option<PostStatus>> {
    match value {
        None | Some("") => Ok(Some(PostStatus::Published)),
        Some("all") => Ok(None),
        Some("draft") => Ok(Some(PostStatus::Draft)),
        Some("published") => Ok(Some(PostStatus::Published)),
        Some(other) => Err(AppError::Validation(format!(
            "Status must be \"draft\", \"published\", or \"all\", got \"{}\"",
            other
        ))),
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(AppError::Validation(format!(
            "Title must be less than {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(())
}

fn validate_excerpt(excerpt: &str) -> Result<()> {
    if excerpt.len() > MAX_EXCERPT_LEN {
        return Err(AppError::Validation(format!(
            "Excerpt must be less than {} characters",
            MAX_EXCERPT_LEN
        )));
    }
    Ok(())
}

/// Validate whichever fields a patch provides, with the creation rules.
pub(crate) fn validate_patch(patch: &PostPatch) -> Result<()> {
    if let Some(title) = &patch.title {
        validate_title(title)?;
    }
    if let Some(content) = &patch.content {
        if content.is_empty() {
            return Err(AppError::Validation("Content cannot be empty".to_string()));
        }
    }
    if let Some(excerpt) = &patch.excerpt {
        validate_excerpt(excerpt)?;
    }
    Ok(())
}

/// Attach counted likes and comments to a page of posts.
pub(crate) async fn attach_counts(
    pool: &PgPool,
    posts: Vec<PostWithAuthor>,
) -> Result<Vec<PostListItem>> {
    let post_ids: Vec<Uuid> = posts.iter().map(|p| p.post.id).collect();

    let like_counts: HashMap<Uuid, i64> = like_repo::count_by_posts(pool, &post_ids)
        .await?
        .into_iter()
        .collect();
    let comment_counts: HashMap<Uuid, i64> = comment_repo::count_by_posts(pool, &post_ids)
        .await?
        .into_iter()
        .collect();

    Ok(posts
        .into_iter()
        .map(|post| {
            let id = post.post.id;
            PostListItem {
                post,
                like_count: like_counts.get(&id).copied().unwrap_or(0),
                comment_count: comment_counts.get(&id).copied().unwrap_or(0),
            }
        })
        .collect())
}

pub struct PostService {
    pool: PgPool,
}

impl PostService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a post. Status defaults to draft; the excerpt is derived
    /// from the content when not supplied.
    pub async fn create(&self, author_id: Uuid, req: CreatePostRequest) -> Result<PostWithAuthor> {
        if req.title.is_empty() || req.content.is_empty() {
            return Err(AppError::Validation(
                "Title and content are required".to_string(),
            ));
        }
        validate_title(&req.title)?;

        let excerpt = match req.excerpt.as_deref() {
            Some(excerpt) if !excerpt.is_empty() => {
                validate_excerpt(excerpt)?;
                excerpt.to_string()
            }
            _ => derive_excerpt(&req.content),
        };

        let status = req.status.unwrap_or(PostStatus::Draft);

        let post = post_repo::create_post(
            &self.pool,
            author_id,
            &req.title,
            &req.content,
            &excerpt,
            req.featured_image.as_deref(),
            status,
        )
        .await?;

        tracing::info!(post_id = %post.id, author_id = %author_id, status = status.as_str(), "post created");

        post_repo::find_post_with_author(&self.pool, post.id)
            .await?
            .ok_or_else(|| AppError::Internal("Created post could not be reloaded".to_string()))
    }

    /// Detail fetch. Reading a post counts as a view, unconditionally —
    /// even for the author, even repeatedly.
    pub async fn get(&self, post_id: Uuid, viewer_id: Option<Uuid>) -> Result<PostDetail> {
        let mut post = post_repo::find_post_with_author(&self.pool, post_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Post with ID {} does not exist", post_id))
            })?;

        post_repo::increment_views(&self.pool, post_id).await?;
        post.post.views_count += 1;

        let like_count = like_repo::count_by_post(&self.pool, post_id).await?;
        let comment_count = comment_repo::count_by_post(&self.pool, post_id).await?;

        let user_liked = match viewer_id {
            Some(viewer_id) => like_repo::find_like(&self.pool, post_id, viewer_id)
                .await?
                .is_some(),
            None => false,
        };

        Ok(PostDetail {
            post,
            like_count,
            comment_count,
            user_liked,
        })
    }

    /// Paginated listing with search and sort. Non-admin callers only
    /// ever see published posts, whatever filter they ask for; drafts
    /// are reachable through the owner's own listing instead.
    #[allow(clippy::too_many_arguments)]
    pub async fn list(
        &self,
        viewer_is_admin: bool,
        status: Option<&str>,
        sort: PostSort,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PostListItem>, i64)> {
        let status = if viewer_is_admin {
            parse_status_filter(status)?
        } else {
            Some(PostStatus::Published)
        };

        let search = search.filter(|s| !s.is_empty());

        let posts = post_repo::list_posts(&self.pool, status, search, sort, limit, offset).await?;
        let total = post_repo::count_posts(&self.pool, status, search).await?;
        let items = attach_counts(&self.pool, posts).await?;

        Ok((items, total))
    }

    /// Partial update, author-only. Admin edits use the separate
    /// unrestricted path and never reach this check.
    pub async fn update(
        &self,
        post_id: Uuid,
        actor_id: Uuid,
        patch: PostPatch,
    ) -> Result<PostWithAuthor> {
        let post = post_repo::find_post_by_id(&self.pool, post_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Post with ID {} does not exist", post_id))
            })?;

        policy::ensure_owner(actor_id, post.user_id, "You can only update your own posts")?;

        validate_patch(&patch)?;

        post_repo::update_post(&self.pool, post_id, &patch).await?;

        post_repo::find_post_with_author(&self.pool, post_id)
            .await?
            .ok_or_else(|| AppError::Internal("Updated post could not be reloaded".to_string()))
    }

    /// Author-only delete, cascading to comments and likes.
    pub async fn delete(&self, post_id: Uuid, actor_id: Uuid) -> Result<()> {
        let post = post_repo::find_post_by_id(&self.pool, post_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Post with ID {} does not exist", post_id))
            })?;

        policy::ensure_owner(actor_id, post.user_id, "You can only delete your own posts")?;

        post_repo::delete_post(&self.pool, post_id).await?;

        tracing::info!(post_id = %post_id, actor_id = %actor_id, "post deleted");

        Ok(())
    }

    /// One author's posts. The public sees published only; the owner and
    /// admins may request any status.
    pub async fn list_by_user(
        &self,
        user_id: Uuid,
        viewer_id: Option<Uuid>,
        viewer_is_admin: bool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Post>, i64)> {
        if user_repo::find_by_id(&self.pool, user_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "User with ID {} does not exist",
                user_id
            )));
        }

        let is_owner = viewer_id == Some(user_id);
        let status = if is_owner || viewer_is_admin {
            parse_status_filter(status)?
        } else {
            Some(PostStatus::Published)
        };

        let posts =
            post_repo::list_posts_by_user(&self.pool, user_id, status, limit, offset).await?;
        let total = post_repo::count_posts_by_user(&self.pool, user_id, status).await?;

        Ok((posts, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_excerpt_short_content() {
        assert_eq!(derive_excerpt("World"), "World");
    }

    #[test]
    fn test_derive_excerpt_truncates_at_500() {
        let content = "x".repeat(800);
        assert_eq!(derive_excerpt(&content).chars().count(), 500);
    }

    #[test]
    fn test_derive_excerpt_respects_char_boundaries() {
        let content = "é".repeat(600);
        let excerpt = derive_excerpt(&content);
        assert_eq!(excerpt.chars().count(), 500);
        assert!(excerpt.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_parse_status_filter() {
        assert_eq!(
            parse_status_filter(None).unwrap(),
            Some(PostStatus::Published)
        );
        assert_eq!(parse_status_filter(Some("all")).unwrap(), None);
        assert_eq!(
            parse_status_filter(Some("draft")).unwrap(),
            Some(PostStatus::Draft)
        );
        assert_eq!(
            parse_status_filter(Some("published")).unwrap(),
            Some(PostStatus::Published)
        );
        assert!(parse_status_filter(Some("archived")).is_err());
    }

    #[test]
    fn test_validate_patch_rejects_oversized_title() {
        let patch = PostPatch {
            title: Some("t".repeat(256)),
            ..Default::default()
        };
        assert!(matches!(
            validate_patch(&patch),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_patch_rejects_empty_present_fields() {
        let patch = PostPatch {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(validate_patch(&patch).is_err());

        let patch = PostPatch {
            content: Some(String::new()),
            ..Default::default()
        };
        assert!(validate_patch(&patch).is_err());
    }

    #[test]
    fn test_validate_patch_accepts_absent_fields() {
        assert!(validate_patch(&PostPatch::default()).is_ok());
    }
}
