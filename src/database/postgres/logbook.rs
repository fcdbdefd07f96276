use async_trait::async_trait;
use sqlx::{postgres::PgRow, FromRow};
use uuid::Uuid;

use super::{decode_media_columns, PgStore, MEDIA_COLUMNS};
use crate::database::aggregate::{collapse, Joined};
use crate::database::models::{Log, NewLog};
use crate::database::store::{LogbookStore, StoreError, StoreResult};

const LOG_COLUMNS: &str = "l.id, l.vehicle_id, l.category, l.title, l.date, l.description, \
                           l.notes, l.cost, l.created_at";

fn decode_row(row: &PgRow) -> Result<Joined<Log>, StoreError> {
    let log = Log::from_row(row)?;
    let media = decode_media_columns(row)?;
    Ok(Joined::new(log, media))
}

#[async_trait]
impl LogbookStore for PgStore {
    async fn get_log_by_id(&self, id: Uuid) -> StoreResult<Option<Log>> {
        let query = format!(
            "SELECT {}, {} FROM logs l LEFT JOIN media m ON m.log_id = l.id \
             WHERE l.id = $1 ORDER BY m.created_at, m.id",
            LOG_COLUMNS, MEDIA_COLUMNS
        );
        let rows = sqlx::query(&query).bind(id).fetch_all(&self.pool).await?;
        let logs = collapse(rows.iter().map(decode_row))?;
        Ok(logs.into_iter().next())
    }

    async fn create_log(&self, log: &NewLog) -> StoreResult<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO logs (id, vehicle_id, category, title, date, description, notes, cost)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(log.vehicle_id)
        .bind(&log.category)
        .bind(&log.title)
        .bind(log.date)
        .bind(&log.description)
        .bind(&log.notes)
        .bind(log.cost)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn list_logs_for_vehicle(&self, vehicle_id: Uuid) -> StoreResult<Vec<Log>> {
        let query = format!(
            "SELECT {}, {} FROM logs l LEFT JOIN media m ON m.log_id = l.id \
             WHERE l.vehicle_id = $1 ORDER BY l.created_at DESC, l.id, m.created_at, m.id",
            LOG_COLUMNS, MEDIA_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(vehicle_id)
            .fetch_all(&self.pool)
            .await?;
        collapse(rows.iter().map(decode_row))
    }
}
