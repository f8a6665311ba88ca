use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Like entity; at most one row per (user_id, post_id), enforced by a
/// unique constraint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Like {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Result of a toggle: the new liked state and the fresh counted total
#[derive(Debug, Serialize)]
pub struct ToggleOutcome {
    pub liked: bool,
    pub like_count: i64,
}

/// Whether the viewer has liked a post
#[derive(Debug, Serialize)]
pub struct LikeStatus {
    pub liked: bool,
}
