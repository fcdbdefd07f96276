use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Directed edge: `follower_id` follows `following_id`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Follower {
    pub id: Uuid,
    pub follower_id: Uuid,
    pub following_id: Uuid,
    pub created_at: DateTime<Utc>,
}
