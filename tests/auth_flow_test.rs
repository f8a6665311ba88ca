//! Exercises the access-control gates over a real actix service: the
//! mandatory gate's failure kinds, the optional gate's pass-through, and
//! the admin gate's role check.
use actix_web::{test, web, App, HttpResponse};
use blog_service::middleware::{AuthUser, MaybeUser, OptionalAuth, RequireAdmin, RequireAuth};
use blog_service::models::Role;
use blog_service::security::jwt;
use serde::Serialize;
use uuid::Uuid;

const TEST_SECRET: &str = "test-only-jwt-secret-0123456789abcdef";

fn init_keys() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        jwt::initialize_keys(TEST_SECRET).expect("failed to initialize test keys");
    });
}

async fn whoami(user: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "username": user.0.username,
        "role": user.0.role,
    }))
}

async fn visibility(viewer: MaybeUser) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "authenticated": viewer.0.is_some(),
    }))
}

async fn admin_area(user: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "admin": user.0.username,
    }))
}

macro_rules! test_app {
    () => {
        test::init_service(
            App::new()
                .service(
                    web::resource("/private")
                        .wrap(RequireAuth)
                        .route(web::get().to(whoami)),
                )
                .service(
                    web::resource("/public")
                        .wrap(OptionalAuth)
                        .route(web::get().to(visibility)),
                )
                .service(
                    web::scope("/admin")
                        .wrap(RequireAdmin)
                        .wrap(RequireAuth)
                        .route("/area", web::get().to(admin_area)),
                ),
        )
        .await
    };
}

fn user_token() -> String {
    jwt::issue_token(Uuid::new_v4(), "alice", "alice@example.com", Role::User, 7)
        .expect("failed to issue token")
}

fn admin_token() -> String {
    jwt::issue_token(Uuid::new_v4(), "root", "root@example.com", Role::Admin, 7)
        .expect("failed to issue token")
}

/// Token with the right signature but an elapsed lifetime.
fn expired_token() -> String {
    #[derive(Serialize)]
    struct StaleClaims {
        sub: String,
        username: String,
        email: String,
        role: String,
        iat: i64,
        exp: i64,
    }

    let now = chrono::Utc::now().timestamp();
    let claims = StaleClaims {
        sub: Uuid::new_v4().to_string(),
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        role: "user".to_string(),
        iat: now - 86_400 * 8,
        exp: now - 86_400,
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("failed to encode expired token")
}

#[actix_web::test]
async fn test_missing_token_fails_closed() {
    init_keys();
    let app = test_app!();

    let req = test::TestRequest::get().uri("/private").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Unauthorized");
}

#[actix_web::test]
async fn test_malformed_token_rejected() {
    init_keys();
    let app = test_app!();

    let req = test::TestRequest::get()
        .uri("/private")
        .insert_header(("Authorization", "Bearer not.a.token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Unauthorized");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("invalid or malformed"));
}

#[actix_web::test]
async fn test_expired_token_reports_expiry() {
    init_keys();
    let app = test_app!();

    let req = test::TestRequest::get()
        .uri("/private")
        .insert_header(("Authorization", format!("Bearer {}", expired_token())))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Token expired");
    assert!(body["expired_at"].is_string());
}

#[actix_web::test]
async fn test_valid_token_passes_gate() {
    init_keys();
    let app = test_app!();

    let req = test::TestRequest::get()
        .uri("/private")
        .insert_header(("Authorization", format!("Bearer {}", user_token())))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["role"], "user");
}

#[actix_web::test]
async fn test_bare_token_without_bearer_prefix_accepted() {
    init_keys();
    let app = test_app!();

    let req = test::TestRequest::get()
        .uri("/private")
        .insert_header(("Authorization", user_token()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn test_optional_gate_allows_anonymous() {
    init_keys();
    let app = test_app!();

    let req = test::TestRequest::get().uri("/public").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["authenticated"], false);
}

#[actix_web::test]
async fn test_optional_gate_ignores_invalid_token() {
    init_keys();
    let app = test_app!();

    let req = test::TestRequest::get()
        .uri("/public")
        .insert_header(("Authorization", "Bearer garbage"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["authenticated"], false);
}

#[actix_web::test]
async fn test_optional_gate_attaches_valid_claims() {
    init_keys();
    let app = test_app!();

    let req = test::TestRequest::get()
        .uri("/public")
        .insert_header(("Authorization", format!("Bearer {}", user_token())))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["authenticated"], true);
}

#[actix_web::test]
async fn test_admin_gate_rejects_plain_user() {
    init_keys();
    let app = test_app!();

    let req = test::TestRequest::get()
        .uri("/admin/area")
        .insert_header(("Authorization", format!("Bearer {}", user_token())))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Forbidden");
}

#[actix_web::test]
async fn test_admin_gate_rejects_anonymous() {
    init_keys();
    let app = test_app!();

    let req = test::TestRequest::get().uri("/admin/area").to_request();
    let resp = test::call_service(&app, req).await;
    // The mandatory gate fires first, so this is 401, not 403
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_admin_gate_admits_admin() {
    init_keys();
    let app = test_app!();

    let req = test::TestRequest::get()
        .uri("/admin/area")
        .insert_header(("Authorization", format!("Bearer {}", admin_token())))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["admin"], "root");
}
