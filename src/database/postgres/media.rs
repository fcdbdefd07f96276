use async_trait::async_trait;

use super::PgStore;
use crate::database::models::Media;
use crate::database::store::{MediaStore, StoreResult};

#[async_trait]
impl MediaStore for PgStore {
    async fn add_media(&self, media: &Media) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO media (id, user_id, vehicle_id, log_id, filename, file_type, location, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(media.id)
        .bind(media.user_id)
        .bind(media.parent.vehicle_id())
        .bind(media.parent.log_id())
        .bind(&media.filename)
        .bind(&media.file_type)
        .bind(&media.location)
        .bind(media.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
