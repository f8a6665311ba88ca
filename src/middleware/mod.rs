/// HTTP middleware for the blog service.
///
/// Three gates compose the access-control surface:
/// - [`RequireAuth`]: fails closed without a valid Bearer token, attaching
///   the decoded claims to the request on success.
/// - [`OptionalAuth`]: attaches claims when a valid token is present, lets
///   the request through unauthenticated otherwise.
/// - [`RequireAdmin`]: composes inside a `RequireAuth` scope and requires
///   the attached claims' role to be admin. It never verifies tokens
///   itself, so standalone use fails closed with 401.
///
/// Handlers read the attached claims through the [`AuthUser`] and
/// [`MaybeUser`] extractors. On routes that mix public and authenticated
/// methods the gates cannot be applied per-method, so the extractors fall
/// back to verifying the Authorization header themselves when no gate has
/// attached claims; failure kinds are identical either way.
use crate::error::AppError;
use crate::security::jwt::{self, Claims};
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::HeaderMap;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::time::Instant;
use uuid::Uuid;

/// Pull the raw token out of the Authorization header. A bare token
/// without the Bearer prefix is accepted, matching the lenient header
/// parsing of the original API.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get("Authorization")?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

// =====================================================================
// Mandatory authentication
// =====================================================================

pub struct RequireAuth;

impl<S, B> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAuthService {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireAuthService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let token = bearer_token(req.headers()).ok_or_else(|| {
                Error::from(AppError::Unauthorized(
                    "Authorization header missing".to_string(),
                ))
            })?;

            let claims = jwt::verify_token(token).map_err(AppError::from)?;

            req.extensions_mut().insert(claims);

            service.call(req).await
        })
    }
}

// =====================================================================
// Optional authentication
// =====================================================================

pub struct OptionalAuth;

impl<S, B> Transform<S, ServiceRequest> for OptionalAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = OptionalAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(OptionalAuthService {
            service: Rc::new(service),
        }))
    }
}

pub struct OptionalAuthService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for OptionalAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            // A missing or invalid token just means an anonymous request.
            if let Some(token) = bearer_token(req.headers()) {
                if let Ok(claims) = jwt::verify_token(token) {
                    req.extensions_mut().insert(claims);
                }
            }

            service.call(req).await
        })
    }
}

// =====================================================================
// Admin gate
// =====================================================================

pub struct RequireAdmin;

impl<S, B> Transform<S, ServiceRequest> for RequireAdmin
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireAdminService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAdminService {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireAdminService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireAdminService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let claims = req.extensions().get::<Claims>().cloned();

            match claims {
                None => Err(AppError::Unauthorized("Authentication required".to_string()).into()),
                Some(claims) if !claims.is_admin() => {
                    Err(AppError::Forbidden("Admin access required".to_string()).into())
                }
                Some(_) => service.call(req).await,
            }
        })
    }
}

// =====================================================================
// Extractors
// =====================================================================

/// Claims attached by [`RequireAuth`]; extraction fails with 401 when the
/// route was not wrapped.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn id(&self) -> Result<Uuid, AppError> {
        self.0.user_id().map_err(AppError::from)
    }
}

impl FromRequest for AuthUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        if let Some(claims) = req.extensions().get::<Claims>().cloned() {
            return ready(Ok(AuthUser(claims)));
        }

        let result = match bearer_token(req.headers()) {
            None => Err(AppError::Unauthorized(
                "Authorization header missing".to_string(),
            )),
            Some(token) => jwt::verify_token(token)
                .map(AuthUser)
                .map_err(AppError::from),
        };

        ready(result.map_err(Error::from))
    }
}

/// Claims attached by [`OptionalAuth`], if any
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Claims>);

impl MaybeUser {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.as_ref().and_then(|c| c.user_id().ok())
    }

    pub fn is_admin(&self) -> bool {
        self.0.as_ref().is_some_and(|c| c.is_admin())
    }
}

impl FromRequest for MaybeUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        if let Some(claims) = req.extensions().get::<Claims>().cloned() {
            return ready(Ok(MaybeUser(Some(claims))));
        }

        let claims = bearer_token(req.headers()).and_then(|token| jwt::verify_token(token).ok());

        ready(Ok(MaybeUser(claims)))
    }
}

// =====================================================================
// Request timing
// =====================================================================

pub struct RequestTimer;

impl<S, B> Transform<S, ServiceRequest> for RequestTimer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTimerService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTimerService {
            service: Rc::new(service),
        }))
    }
}

pub struct RequestTimerService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestTimerService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let path = req.path().to_string();
        let method = req.method().to_string();
        let start = Instant::now();

        Box::pin(async move {
            let res = service.call(req).await;
            let elapsed = start.elapsed().as_millis();
            tracing::debug!(%method, %path, %elapsed, "request completed");
            res
        })
    }
}
