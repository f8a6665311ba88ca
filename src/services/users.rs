/// Profile management: public profiles, self-service edits, password
/// changes.
use crate::db::{post_repo, user_repo};
use crate::error::{AppError, Result};
use crate::models::{ChangePasswordRequest, PostStatus, ProfilePatch, PublicUser, UserProfile};
use crate::policy;
use crate::security::password;
use crate::validators;
use sqlx::PgPool;
use uuid::Uuid;

const RECENT_POSTS_LIMIT: i64 = 5;
const MAX_FULL_NAME_LEN: usize = 100;
const MAX_AVATAR_URL_LEN: usize = 255;

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Public profile: user plus published-post activity.
    pub async fn get_profile(&self, user_id: Uuid) -> Result<UserProfile> {
        let user = user_repo::find_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User with ID {} does not exist", user_id))
            })?;

        let post_count =
            post_repo::count_posts_by_user(&self.pool, user_id, Some(PostStatus::Published))
                .await?;

        let recent_posts = post_repo::recent_posts_by_user(
            &self.pool,
            user_id,
            Some(PostStatus::Published),
            RECENT_POSTS_LIMIT,
        )
        .await?;

        Ok(UserProfile {
            user: user.into(),
            post_count,
            recent_posts,
        })
    }

    /// Apply a profile patch. Self-only; admins use the moderation
    /// endpoints, which touch a different field set.
    pub async fn update_profile(
        &self,
        actor_id: Uuid,
        user_id: Uuid,
        patch: ProfilePatch,
    ) -> Result<PublicUser> {
        let user = user_repo::find_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User with ID {} does not exist", user_id))
            })?;

        policy::ensure_owner(actor_id, user.id, "You can only update your own profile")?;

        if let Some(full_name) = &patch.full_name {
            if full_name.len() > MAX_FULL_NAME_LEN {
                return Err(AppError::Validation(format!(
                    "Full name must be less than {} characters",
                    MAX_FULL_NAME_LEN
                )));
            }
        }

        if let Some(avatar_url) = &patch.avatar_url {
            if avatar_url.len() > MAX_AVATAR_URL_LEN {
                return Err(AppError::Validation(format!(
                    "Avatar URL must be less than {} characters",
                    MAX_AVATAR_URL_LEN
                )));
            }
        }

        let updated = user_repo::update_profile(&self.pool, user_id, &patch).await?;

        Ok(updated.into())
    }

    /// Change the account password after re-proving the current one.
    pub async fn change_password(
        &self,
        actor_id: Uuid,
        user_id: Uuid,
        req: ChangePasswordRequest,
    ) -> Result<()> {
        let user = user_repo::find_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User with ID {} does not exist", user_id))
            })?;

        policy::ensure_owner(actor_id, user.id, "You can only change your own password")?;

        if req.current_password.is_empty()
            || req.new_password.is_empty()
            || req.confirm_password.is_empty()
        {
            return Err(AppError::Validation(
                "Please provide current password and new password".to_string(),
            ));
        }

        if req.new_password != req.confirm_password {
            return Err(AppError::Validation(
                "New passwords do not match".to_string(),
            ));
        }

        if !validators::validate_password(&req.new_password) {
            return Err(AppError::Validation(
                "Password must be at least 8 characters with uppercase, lowercase, and number"
                    .to_string(),
            ));
        }

        if !password::verify_password(&req.current_password, &user.password_hash)? {
            return Err(AppError::Unauthorized(
                "The current password you provided is incorrect".to_string(),
            ));
        }

        let new_hash = password::hash_password(&req.new_password)?;
        user_repo::update_password(&self.pool, user_id, &new_hash).await?;

        tracing::info!(user_id = %user_id, "password changed");

        Ok(())
    }
}
