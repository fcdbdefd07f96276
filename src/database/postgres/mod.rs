//! Postgres implementation of every store trait.

mod follower;
mod garage;
mod logbook;
mod media;
mod profile;
mod user;

use sqlx::{postgres::PgRow, PgPool, Row};

use super::models::MediaItem;

/// Relational store backed by a shared connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Columns selected for the media side of a parent/media left join.
const MEDIA_COLUMNS: &str = "m.id AS media_id, m.filename AS media_filename, \
                             m.file_type AS media_file_type, m.location AS media_location";

/// Decode the media side of a joined row. A null `media_id` means the
/// parent had no media; any other null in a present row is a decode error.
fn decode_media_columns(row: &PgRow) -> Result<Option<MediaItem>, sqlx::Error> {
    let id: Option<uuid::Uuid> = row.try_get("media_id")?;
    let Some(id) = id else {
        return Ok(None);
    };

    Ok(Some(MediaItem {
        id,
        filename: row.try_get("media_filename")?,
        file_type: row.try_get("media_file_type")?,
        location: row.try_get("media_location")?,
    }))
}
