use crate::models::comment::CommentWithAuthor;
use crate::models::like::Like;
use crate::models::user::AuthorSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Post status matching the database post_status type.
///
/// `draft -> published` stamps `published_at` once; `published -> draft`
/// never clears it (publish history is permanent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "post_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

/// Sort modes for post listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostSort {
    Latest,
    Oldest,
    Popular,
}

impl PostSort {
    /// Parse a query parameter, defaulting to newest-first.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("oldest") => PostSort::Oldest,
            Some("popular") => PostSort::Popular,
            _ => PostSort::Latest,
        }
    }

    /// ORDER BY clause for the listing query. Static strings only; this
    /// is interpolated into SQL.
    pub fn order_clause(&self) -> &'static str {
        match self {
            PostSort::Latest => "p.created_at DESC",
            PostSort::Oldest => "p.created_at ASC",
            PostSort::Popular => "p.views_count DESC",
        }
    }
}

/// Post entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub status: PostStatus,
    pub views_count: i64,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact post projection for profile views
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub excerpt: Option<String>,
    pub status: PostStatus,
    pub views_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Post joined with its author summary
#[derive(Debug, Serialize)]
pub struct PostWithAuthor {
    #[serde(flatten)]
    pub post: Post,
    pub author: AuthorSummary,
}

/// Listing row: post, author, and derived engagement counts
#[derive(Debug, Serialize)]
pub struct PostListItem {
    #[serde(flatten)]
    pub post: PostWithAuthor,
    pub like_count: i64,
    pub comment_count: i64,
}

/// Detail view: listing row plus the viewer's like state
#[derive(Debug, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: PostWithAuthor,
    pub like_count: i64,
    pub comment_count: i64,
    pub user_liked: bool,
}

/// Admin detail view: engagement counts plus recent activity
#[derive(Debug, Serialize)]
pub struct AdminPostDetail {
    #[serde(flatten)]
    pub post: PostWithAuthor,
    pub like_count: i64,
    pub comment_count: i64,
    pub recent_comments: Vec<CommentWithAuthor>,
    pub recent_likes: Vec<Like>,
}

/// Post creation request
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub status: Option<PostStatus>,
}

/// Partial post update; only provided fields are applied, each with the
/// same validation as creation.
#[derive(Debug, Default, Deserialize)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub status: Option<PostStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_parse() {
        assert_eq!(PostSort::parse(None), PostSort::Latest);
        assert_eq!(PostSort::parse(Some("latest")), PostSort::Latest);
        assert_eq!(PostSort::parse(Some("oldest")), PostSort::Oldest);
        assert_eq!(PostSort::parse(Some("popular")), PostSort::Popular);
        // Unknown values fall back to the default rather than erroring
        assert_eq!(PostSort::parse(Some("bogus")), PostSort::Latest);
    }

    #[test]
    fn test_status_serde_round_trip() {
        let json = serde_json::to_string(&PostStatus::Published).unwrap();
        assert_eq!(json, "\"published\"");
        let status: PostStatus = serde_json::from_str("\"draft\"").unwrap();
        assert_eq!(status, PostStatus::Draft);
    }
}
