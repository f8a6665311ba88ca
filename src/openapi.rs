/// OpenAPI documentation for the blog service
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Blog Service API",
        version = "1.0.0",
        description = "Multi-user blogging service. Handles registration and JWT authentication, post creation with a draft/publish lifecycle, one-level threaded comments, like toggling, and an admin moderation dashboard.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development server"),
    ),
    tags(
        (name = "health", description = "Service health checks"),
        (name = "auth", description = "Registration, login, and identity"),
        (name = "users", description = "Public profiles and self-service edits"),
        (name = "posts", description = "Post creation, listing, updates, and deletion"),
        (name = "comments", description = "Threaded comments on posts"),
        (name = "likes", description = "Like toggling and like listings"),
        (name = "admin", description = "User and post moderation (admin role required)"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token from /api/auth/login"))
                        .build(),
                ),
            )
        }
    }
}
