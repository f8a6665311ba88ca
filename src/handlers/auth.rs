/// Authentication endpoints: register, login, and token reconciliation.
use crate::config::Config;
use crate::error::Result;
use crate::handlers::{created, ok, ok_with_message};
use crate::middleware::AuthUser;
use crate::models::{LoginRequest, RegisterRequest};
use crate::services::AuthService;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

/// POST /api/auth/register
pub async fn register(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let service = AuthService::new((**pool).clone(), config.auth.token_expiry_days);
    let (token, user) = service.register(req.into_inner()).await?;

    Ok(created(
        serde_json::json!({ "token": token, "user": user }),
        "Registration successful",
    ))
}

/// POST /api/auth/login
pub async fn login(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let service = AuthService::new((**pool).clone(), config.auth.token_expiry_days);
    let (token, user) = service.login(req.into_inner()).await?;

    Ok(ok_with_message(
        serde_json::json!({ "token": token, "user": user }),
        "Login successful",
    ))
}

/// GET /api/auth/me
pub async fn me(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: AuthUser,
) -> Result<HttpResponse> {
    let service = AuthService::new((**pool).clone(), config.auth.token_expiry_days);
    let current = service.me(user.id()?).await?;

    Ok(ok(current))
}
