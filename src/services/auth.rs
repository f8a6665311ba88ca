/// Registration, login, and identity reconciliation.
use crate::db::user_repo;
use crate::error::{AppError, Result};
use crate::models::{LoginRequest, PublicUser, RegisterRequest};
use crate::security::{jwt, password};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

pub struct AuthService {
    pool: PgPool,
    token_expiry_days: i64,
}

impl AuthService {
    pub fn new(pool: PgPool, token_expiry_days: i64) -> Self {
        Self {
            pool,
            token_expiry_days,
        }
    }

    /// Register a new account and issue its first session token.
    pub async fn register(&self, req: RegisterRequest) -> Result<(String, PublicUser)> {
        req.validate()?;

        if user_repo::find_by_username(&self.pool, &req.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("This username is already taken".to_string()));
        }

        if user_repo::find_by_email(&self.pool, &req.email)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("This email is already registered".to_string()));
        }

        let password_hash = password::hash_password(&req.password)?;

        // A registration racing this one still trips the unique
        // constraints; the sqlx conversion surfaces that as a conflict.
        let user = user_repo::create_user(
            &self.pool,
            &req.username,
            &req.email,
            &password_hash,
            req.full_name.as_deref(),
        )
        .await?;

        let token = jwt::issue_token(
            user.id,
            &user.username,
            &user.email,
            user.role,
            self.token_expiry_days,
        )?;

        tracing::info!(user_id = %user.id, username = %user.username, "user registered");

        Ok((token, user.into()))
    }

    /// Authenticate by email or username and issue a fresh token.
    pub async fn login(&self, req: LoginRequest) -> Result<(String, PublicUser)> {
        if req.password.is_empty() || (req.email.is_none() && req.username.is_none()) {
            return Err(AppError::Validation(
                "Please provide email/username and password".to_string(),
            ));
        }

        let user = match (req.email.as_deref(), req.username.as_deref()) {
            (Some(email), _) => user_repo::find_by_email(&self.pool, email).await?,
            (None, Some(username)) => user_repo::find_by_username(&self.pool, username).await?,
            (None, None) => None,
        };

        let user = user.ok_or_else(|| {
            AppError::NotFound("Invalid email/username or password".to_string())
        })?;

        if !password::verify_password(&req.password, &user.password_hash)? {
            return Err(AppError::Unauthorized(
                "Invalid email/username or password".to_string(),
            ));
        }

        let token = jwt::issue_token(
            user.id,
            &user.username,
            &user.email,
            user.role,
            self.token_expiry_days,
        )?;

        tracing::info!(user_id = %user.id, "user logged in");

        Ok((token, user.into()))
    }

    /// Reconcile token claims with the current database state. This is
    /// the only place stale claims are refreshed against the store.
    pub async fn me(&self, user_id: Uuid) -> Result<PublicUser> {
        let user = user_repo::find_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(
                    "The user associated with this token no longer exists".to_string(),
                )
            })?;

        Ok(user.into())
    }
}
