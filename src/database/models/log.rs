use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::media::MediaItem;

/// Logbook entry. Entries are never edited after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Log {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub category: String,
    pub title: String,
    pub date: NaiveDate,
    pub description: String,
    pub notes: String,
    pub cost: Decimal,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    #[serde(default)]
    pub media: Vec<MediaItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewLog {
    pub vehicle_id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub cost: Decimal,
}
