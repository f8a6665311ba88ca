/// Idempotent like toggling.
use crate::db::{like_repo, post_repo};
use crate::error::{AppError, Result};
use crate::models::{AuthorSummary, LikeStatus, ToggleOutcome};
use sqlx::PgPool;
use uuid::Uuid;

pub struct LikeService {
    pool: PgPool,
}

impl LikeService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Flip the (user, post) like state and return the fresh count.
    ///
    /// The unique constraint makes this safe under concurrent toggles: a
    /// losing insert affects zero rows and is reported as "liked", since
    /// a like row for the pair exists either way.
    pub async fn toggle(&self, post_id: Uuid, user_id: Uuid) -> Result<ToggleOutcome> {
        if post_repo::find_post_by_id(&self.pool, post_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        let liked = if like_repo::delete_like(&self.pool, post_id, user_id).await? {
            false
        } else {
            like_repo::insert_like(&self.pool, post_id, user_id).await?;
            true
        };

        let like_count = like_repo::count_by_post(&self.pool, post_id).await?;

        Ok(ToggleOutcome { liked, like_count })
    }

    /// Whether the viewer has liked the post; anonymous viewers are
    /// simply unliked.
    pub async fn status(&self, post_id: Uuid, viewer_id: Option<Uuid>) -> Result<LikeStatus> {
        let Some(viewer_id) = viewer_id else {
            return Ok(LikeStatus { liked: false });
        };

        if post_repo::find_post_by_id(&self.pool, post_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        let liked = like_repo::find_like(&self.pool, post_id, viewer_id)
            .await?
            .is_some();

        Ok(LikeStatus { liked })
    }

    /// Page of users who liked the post, newest like first.
    pub async fn likers(
        &self,
        post_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<AuthorSummary>, i64)> {
        if post_repo::find_post_by_id(&self.pool, post_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        let likers = like_repo::list_likers(&self.pool, post_id, limit, offset).await?;
        let total = like_repo::count_by_post(&self.pool, post_id).await?;

        Ok((likers, total))
    }
}
