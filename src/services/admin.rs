/// Admin moderation: user management, unrestricted post management, and
/// dashboard statistics.
///
/// These paths bypass the ownership policy by design; the admin gate in
/// the middleware is the authorization boundary. The only checks that
/// remain are the self-protection rules.
use crate::db::{comment_repo, like_repo, post_repo, user_repo};
use crate::error::{AppError, Result};
use crate::models::{
    AdminPostDetail, AdminUserDetail, AdminUserPatch, Post, PostListItem, PostPatch, PostSort,
    PublicUser,
};
use crate::policy;
use crate::services::posts::{attach_counts, parse_status_filter, validate_patch};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

const RECENT_ACTIVITY_LIMIT: i64 = 10;

#[derive(Debug, Serialize)]
pub struct UserTotals {
    pub total: i64,
    pub admins: i64,
    pub banned: i64,
}

#[derive(Debug, Serialize)]
pub struct PostTotals {
    pub total: i64,
    pub published: i64,
    pub draft: i64,
}

/// Dashboard statistics
#[derive(Debug, Serialize)]
pub struct AdminStats {
    pub users: UserTotals,
    pub posts: PostTotals,
    pub comments: i64,
    pub likes: i64,
}

pub struct AdminService {
    pool: PgPool,
}

impl AdminService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub async fn list_users(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PublicUser>, i64)> {
        let search = search.filter(|s| !s.is_empty());

        let users = user_repo::list_users(&self.pool, search, limit, offset).await?;
        let total = user_repo::count_users(&self.pool, search).await?;

        Ok((users.into_iter().map(PublicUser::from).collect(), total))
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<AdminUserDetail> {
        let user = user_repo::find_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User with ID {} does not exist", user_id))
            })?;

        let recent_posts =
            post_repo::recent_posts_by_user(&self.pool, user_id, None, RECENT_ACTIVITY_LIMIT)
                .await?;

        Ok(AdminUserDetail {
            user: user.into(),
            recent_posts,
        })
    }

    /// Update a user's role and/or ban flag. An admin can demote other
    /// admins but never themselves.
    pub async fn update_user(
        &self,
        actor_id: Uuid,
        user_id: Uuid,
        patch: AdminUserPatch,
    ) -> Result<PublicUser> {
        let user = user_repo::find_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User with ID {} does not exist", user_id))
            })?;

        if let Some(new_role) = patch.role {
            policy::ensure_not_self_demotion(actor_id, user.id, user.role, new_role)?;
        }

        let updated = user_repo::apply_admin_patch(&self.pool, user_id, &patch).await?;

        tracing::info!(
            actor_id = %actor_id,
            user_id = %user_id,
            role = ?patch.role,
            is_banned = ?patch.is_banned,
            "user moderated"
        );

        Ok(updated.into())
    }

    /// Delete a user and all their content. Self-deletion is blocked so
    /// an admin cannot lock themselves out.
    pub async fn delete_user(&self, actor_id: Uuid, user_id: Uuid) -> Result<()> {
        let user = user_repo::find_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User with ID {} does not exist", user_id))
            })?;

        policy::ensure_not_self_delete(actor_id, user.id)?;

        user_repo::delete_user(&self.pool, user_id).await?;

        tracing::info!(actor_id = %actor_id, user_id = %user_id, "user deleted");

        Ok(())
    }

    // ------------------------------------------------------------------
    // Posts
    // ------------------------------------------------------------------

    /// List posts of any status, with search.
    pub async fn list_posts(
        &self,
        status: Option<&str>,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PostListItem>, i64)> {
        // Unlike the public listing, the default here is all statuses.
        let status = match status {
            None | Some("") => None,
            other => parse_status_filter(other)?,
        };
        let search = search.filter(|s| !s.is_empty());

        let posts = post_repo::list_posts(
            &self.pool,
            status,
            search,
            PostSort::Latest,
            limit,
            offset,
        )
        .await?;
        let total = post_repo::count_posts(&self.pool, status, search).await?;
        let items = attach_counts(&self.pool, posts).await?;

        Ok((items, total))
    }

    pub async fn get_post(&self, post_id: Uuid) -> Result<AdminPostDetail> {
        let post = post_repo::find_post_with_author(&self.pool, post_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Post with ID {} does not exist", post_id))
            })?;

        let like_count = like_repo::count_by_post(&self.pool, post_id).await?;
        let comment_count = comment_repo::count_by_post(&self.pool, post_id).await?;
        let recent_comments =
            comment_repo::recent_comments(&self.pool, post_id, RECENT_ACTIVITY_LIMIT).await?;
        let recent_likes =
            like_repo::recent_likes(&self.pool, post_id, RECENT_ACTIVITY_LIMIT).await?;

        Ok(AdminPostDetail {
            post,
            like_count,
            comment_count,
            recent_comments,
            recent_likes,
        })
    }

    /// Unrestricted post patch: no ownership check, but field validation
    /// and the first-publish rule still apply.
    pub async fn update_post(&self, post_id: Uuid, patch: PostPatch) -> Result<Post> {
        if post_repo::find_post_by_id(&self.pool, post_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "Post with ID {} does not exist",
                post_id
            )));
        }

        validate_patch(&patch)?;

        let updated = post_repo::update_post(&self.pool, post_id, &patch).await?;

        Ok(updated)
    }

    /// Unrestricted post delete, cascading to comments and likes.
    pub async fn delete_post(&self, actor_id: Uuid, post_id: Uuid) -> Result<()> {
        if post_repo::find_post_by_id(&self.pool, post_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "Post with ID {} does not exist",
                post_id
            )));
        }

        post_repo::delete_post(&self.pool, post_id).await?;

        tracing::info!(actor_id = %actor_id, post_id = %post_id, "post deleted by admin");

        Ok(())
    }

    // ------------------------------------------------------------------
    // Stats
    // ------------------------------------------------------------------

    pub async fn stats(&self) -> Result<AdminStats> {
        let (total_users, admins, banned) = user_repo::user_stats(&self.pool).await?;
        let (total_posts, published, draft) = post_repo::post_stats(&self.pool).await?;
        let comments = comment_repo::count_all(&self.pool).await?;
        let likes = like_repo::count_all(&self.pool).await?;

        Ok(AdminStats {
            users: UserTotals {
                total: total_users,
                admins,
                banned,
            },
            posts: PostTotals {
                total: total_posts,
                published,
                draft,
            },
            comments,
            likes,
        })
    }
}
