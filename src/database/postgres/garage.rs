use async_trait::async_trait;
use sqlx::{postgres::PgRow, FromRow};
use uuid::Uuid;

use super::{decode_media_columns, PgStore, MEDIA_COLUMNS};
use crate::database::aggregate::{collapse, Joined};
use crate::database::models::{NewVehicle, Vehicle, VehiclePatch};
use crate::database::store::{GarageStore, StoreError, StoreResult};

const VEHICLE_COLUMNS: &str = "v.id, v.user_id, v.registration, v.make, v.model, v.year, \
                               v.engine_size, v.color, v.registered, v.tax_date, v.mot_date, \
                               v.insurance_date, v.service_date, v.description, v.mileage, \
                               v.nickname, v.created_at";

fn joined_select(filter: &str) -> String {
    format!(
        "SELECT {}, {} FROM vehicles v LEFT JOIN media m ON m.vehicle_id = v.id \
         WHERE {} ORDER BY v.created_at, v.id, m.created_at, m.id",
        VEHICLE_COLUMNS, MEDIA_COLUMNS, filter
    )
}

fn decode_row(row: &PgRow) -> Result<Joined<Vehicle>, StoreError> {
    let vehicle = Vehicle::from_row(row)?;
    let media = decode_media_columns(row)?;
    Ok(Joined::new(vehicle, media))
}

impl PgStore {
    async fn fetch_vehicles(&self, filter: &str, binds: VehicleFilter<'_>) -> StoreResult<Vec<Vehicle>> {
        let query = joined_select(filter);
        let mut q = sqlx::query(&query);
        q = match binds {
            VehicleFilter::Id(id) => q.bind(id),
            VehicleFilter::Owner(user_id) => q.bind(user_id),
            VehicleFilter::Registration(user_id, registration) => q.bind(user_id).bind(registration),
        };
        let rows = q.fetch_all(&self.pool).await?;
        collapse(rows.iter().map(decode_row))
    }
}

enum VehicleFilter<'a> {
    Id(Uuid),
    Owner(Uuid),
    Registration(Uuid, &'a str),
}

#[async_trait]
impl GarageStore for PgStore {
    async fn get_vehicle_by_id(&self, id: Uuid) -> StoreResult<Option<Vehicle>> {
        let vehicles = self.fetch_vehicles("v.id = $1", VehicleFilter::Id(id)).await?;
        Ok(vehicles.into_iter().next())
    }

    async fn list_user_vehicles(&self, user_id: Uuid) -> StoreResult<Vec<Vehicle>> {
        self.fetch_vehicles("v.user_id = $1", VehicleFilter::Owner(user_id))
            .await
    }

    async fn get_vehicle_by_registration(
        &self,
        user_id: Uuid,
        registration: &str,
    ) -> StoreResult<Option<Vehicle>> {
        let vehicles = self
            .fetch_vehicles(
                "v.user_id = $1 AND v.registration = $2",
                VehicleFilter::Registration(user_id, registration),
            )
            .await?;
        Ok(vehicles.into_iter().next())
    }

    async fn vehicle_exists(&self, user_id: Uuid, registration: &str) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM vehicles WHERE user_id = $1 AND registration = $2)",
        )
        .bind(user_id)
        .bind(registration)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn add_vehicle(&self, user_id: Uuid, vehicle: &NewVehicle) -> StoreResult<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO vehicles (
                id, user_id, registration, make, model, year, engine_size, color,
                registered, tax_date, mot_date, insurance_date, service_date,
                description, mileage, nickname
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&vehicle.registration)
        .bind(&vehicle.make)
        .bind(&vehicle.model)
        .bind(vehicle.year)
        .bind(vehicle.engine_size)
        .bind(&vehicle.color)
        .bind(&vehicle.registered)
        .bind(&vehicle.tax_date)
        .bind(&vehicle.mot_date)
        .bind(&vehicle.insurance_date)
        .bind(&vehicle.service_date)
        .bind(&vehicle.description)
        .bind(vehicle.mileage)
        .bind(&vehicle.nickname)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_vehicle(
        &self,
        user_id: Uuid,
        registration: &str,
        patch: &VehiclePatch,
    ) -> StoreResult<Option<Vehicle>> {
        let updated = sqlx::query(
            r#"
            UPDATE vehicles SET
                description = COALESCE($3, description),
                tax_date = COALESCE($4, tax_date),
                mot_date = COALESCE($5, mot_date),
                insurance_date = COALESCE($6, insurance_date),
                service_date = COALESCE($7, service_date),
                mileage = COALESCE($8, mileage),
                nickname = COALESCE($9, nickname)
            WHERE user_id = $1 AND registration = $2
            "#,
        )
        .bind(user_id)
        .bind(registration)
        .bind(patch.description.as_deref())
        .bind(patch.tax_date.as_deref())
        .bind(patch.mot_date.as_deref())
        .bind(patch.insurance_date.as_deref())
        .bind(patch.service_date.as_deref())
        .bind(patch.mileage)
        .bind(patch.nickname.as_deref())
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_vehicle_by_registration(user_id, registration).await
    }
}
