/// HTTP handlers.
///
/// Handlers stay thin: extract inputs, call the service, wrap the result
/// in the response envelope. Success responses carry
/// `{success: true, data, message?}`; list responses add a `pagination`
/// object. Error envelopes are produced by `AppError`.
pub mod admin;
pub mod auth;
pub mod comments;
pub mod likes;
pub mod posts;
pub mod users;

use actix_web::HttpResponse;
use serde::Serialize;

pub(crate) const MAX_PAGE_SIZE: i64 = 100;

/// Clamped pagination window derived from `page`/`limit` query params.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    pub fn meta(&self, total: i64) -> PageMeta {
        let pages = if total == 0 {
            0
        } else {
            (total + self.limit - 1) / self.limit
        };
        PageMeta {
            total,
            pages,
            current_page: self.page,
            limit: self.limit,
        }
    }
}

/// Pagination metadata returned by every list endpoint
#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub pages: i64,
    pub current_page: i64,
    pub limit: i64,
}

pub(crate) fn ok(data: impl Serialize) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": data,
    }))
}

pub(crate) fn ok_with_message(data: impl Serialize, message: &str) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": message,
        "data": data,
    }))
}

pub(crate) fn created(data: impl Serialize, message: &str) -> HttpResponse {
    HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "message": message,
        "data": data,
    }))
}

pub(crate) fn message_only(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": message,
    }))
}

pub(crate) fn paginated(data: impl Serialize, meta: PageMeta) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": data,
        "pagination": meta,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults() {
        let page = Page::new(None, None, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 10);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_page_clamping() {
        let page = Page::new(Some(0), Some(500), 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, MAX_PAGE_SIZE);

        let page = Page::new(Some(-3), Some(0), 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 1);
    }

    #[test]
    fn test_page_offset() {
        let page = Page::new(Some(3), Some(20), 10);
        assert_eq!(page.offset(), 40);
    }

    #[test]
    fn test_page_meta_rounds_up() {
        let page = Page::new(Some(1), Some(10), 10);
        assert_eq!(page.meta(0).pages, 0);
        assert_eq!(page.meta(1).pages, 1);
        assert_eq!(page.meta(10).pages, 1);
        assert_eq!(page.meta(11).pages, 2);
    }
}
