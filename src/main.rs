use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use blog_service::handlers;
use blog_service::middleware;
use blog_service::openapi::ApiDoc;
use blog_service::security::jwt;
use blog_service::{AppError, Config};
use sqlx::postgres::PgPoolOptions;
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Liveness plus a database ping.
async fn health(pool: web::Data<sqlx::PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "blog-service",
            "version": env!("CARGO_PKG_VERSION"),
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("database connection failed: {}", e),
            "service": "blog-service",
        })),
    }
}

async fn openapi_json(doc: web::Data<utoipa::openapi::OpenApi>) -> actix_web::Result<HttpResponse> {
    let body = serde_json::to_string(&*doc).map_err(|e| {
        tracing::error!("OpenAPI serialization failed: {}", e);
        actix_web::error::ErrorInternalServerError("OpenAPI serialization error")
    })?;

    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .body(body))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting blog-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    jwt::initialize_keys(&config.auth.jwt_secret).map_err(|e| {
        io::Error::new(
            io::ErrorKind::Other,
            format!("Failed to initialize JWT keys: {e}"),
        )
    })?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::Other,
                format!("Failed to create database pool: {e}"),
            )
        })?;

    tracing::info!("Connected to database");

    sqlx::migrate!().run(&pool).await.map_err(|e| {
        io::Error::new(io::ErrorKind::Other, format!("Migration failed: {e}"))
    })?;

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in config.cors.allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        let openapi_doc = ApiDoc::openapi();

        App::new()
            .app_data(web::Data::new(openapi_doc.clone()))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api/openapi.json", openapi_doc.clone()),
            )
            .route("/api/openapi.json", web::get().to(openapi_json))
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config.clone()))
            // Malformed bodies, paths, and query strings use the same
            // error envelope as everything else.
            .app_data(web::JsonConfig::default().error_handler(|err, _| {
                AppError::Validation(err.to_string()).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _| {
                AppError::Validation(err.to_string()).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _| {
                AppError::Validation(err.to_string()).into()
            }))
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/api/health", web::get().to(health))
            .service(
                web::scope("/api")
                    .wrap(middleware::RequestTimer)
                    .service(
                        web::scope("/auth")
                            .route("/register", web::post().to(handlers::auth::register))
                            .route("/login", web::post().to(handlers::auth::login))
                            .service(
                                web::resource("/me")
                                    .wrap(middleware::RequireAuth)
                                    .route(web::get().to(handlers::auth::me)),
                            ),
                    )
                    .service(
                        web::scope("/users")
                            .wrap(middleware::OptionalAuth)
                            .service(
                                web::resource("/{id}/posts")
                                    .route(web::get().to(handlers::users::list_user_posts)),
                            )
                            .service(
                                web::resource("/{id}/password")
                                    .route(web::put().to(handlers::users::change_password)),
                            )
                            .service(
                                web::resource("/{id}")
                                    .route(web::get().to(handlers::users::get_user))
                                    .route(web::put().to(handlers::users::update_profile)),
                            ),
                    )
                    .service(
                        web::scope("/posts")
                            .wrap(middleware::OptionalAuth)
                            .service(
                                web::resource("")
                                    .route(web::get().to(handlers::posts::list_posts))
                                    .route(web::post().to(handlers::posts::create_post)),
                            )
                            .service(
                                web::resource("/{id}/comments")
                                    .route(web::get().to(handlers::comments::list_comments))
                                    .route(web::post().to(handlers::comments::create_comment)),
                            )
                            .service(
                                web::resource("/{id}/comments/{comment_id}")
                                    .route(web::put().to(handlers::comments::update_comment))
                                    .route(web::delete().to(handlers::comments::delete_comment)),
                            )
                            .service(
                                web::resource("/{id}/like")
                                    .route(web::post().to(handlers::likes::toggle_like)),
                            )
                            .service(
                                web::resource("/{id}/like/status")
                                    .route(web::get().to(handlers::likes::like_status)),
                            )
                            .service(
                                web::resource("/{id}/likes")
                                    .route(web::get().to(handlers::likes::list_likes)),
                            )
                            .service(
                                web::resource("/{id}")
                                    .route(web::get().to(handlers::posts::get_post))
                                    .route(web::put().to(handlers::posts::update_post))
                                    .route(web::delete().to(handlers::posts::delete_post)),
                            ),
                    )
                    .service(
                        web::scope("/admin")
                            .wrap(middleware::RequireAdmin)
                            .wrap(middleware::RequireAuth)
                            .service(
                                web::resource("/users")
                                    .route(web::get().to(handlers::admin::list_users)),
                            )
                            .service(
                                web::resource("/users/{id}")
                                    .route(web::get().to(handlers::admin::get_user))
                                    .route(web::put().to(handlers::admin::update_user))
                                    .route(web::delete().to(handlers::admin::delete_user)),
                            )
                            .service(
                                web::resource("/posts")
                                    .route(web::get().to(handlers::admin::list_posts)),
                            )
                            .service(
                                web::resource("/posts/{id}")
                                    .route(web::get().to(handlers::admin::get_post))
                                    .route(web::put().to(handlers::admin::update_post))
                                    .route(web::delete().to(handlers::admin::delete_post)),
                            )
                            .route("/stats", web::get().to(handlers::admin::stats)),
                    ),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
