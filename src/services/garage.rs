use std::sync::Arc;

use uuid::Uuid;

use super::media::{MediaService, Upload};
use super::{ServiceError, ServiceResult};
use crate::config::EmptyPatchPolicy;
use crate::database::models::{normalize_registration, Media, MediaParent, NewVehicle, Vehicle, VehiclePatch};
use crate::database::store::GarageStore;
use crate::database::{Store, StoreError};

const DUPLICATE_VEHICLE: &str = "vehicle already added";

/// The caller's garage. Every operation is scoped to the acting user.
#[derive(Clone)]
pub struct GarageService {
    store: Arc<dyn Store>,
    media: MediaService,
    empty_patch: EmptyPatchPolicy,
}

impl GarageService {
    pub fn new(store: Arc<dyn Store>, media: MediaService, empty_patch: EmptyPatchPolicy) -> Self {
        Self {
            store,
            media,
            empty_patch,
        }
    }

    pub async fn add(&self, user_id: Uuid, vehicle: NewVehicle) -> ServiceResult<Uuid> {
        let vehicle = NewVehicle {
            registration: normalize_registration(&vehicle.registration),
            ..vehicle
        };
        if vehicle.registration.is_empty() {
            return Err(ServiceError::bad_request("registration is required"));
        }
        if vehicle.mileage < 0 {
            return Err(ServiceError::bad_request("mileage cannot be negative"));
        }

        if self.store.vehicle_exists(user_id, &vehicle.registration).await? {
            return Err(ServiceError::conflict(DUPLICATE_VEHICLE));
        }

        // The unique index still catches a concurrent insert of the same pair.
        let id = self
            .store
            .add_vehicle(user_id, &vehicle)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => ServiceError::conflict(DUPLICATE_VEHICLE),
                other => other.into(),
            })?;

        tracing::info!(user_id = %user_id, vehicle_id = %id, registration = %vehicle.registration, "Added vehicle");
        Ok(id)
    }

    pub async fn list(&self, user_id: Uuid) -> ServiceResult<Vec<Vehicle>> {
        Ok(self.store.list_user_vehicles(user_id).await?)
    }

    pub async fn get(&self, user_id: Uuid, registration: &str) -> ServiceResult<Vehicle> {
        let registration = normalize_registration(registration);
        self.store
            .get_vehicle_by_registration(user_id, &registration)
            .await?
            .ok_or_else(|| ServiceError::not_found("vehicle not found"))
    }

    pub async fn exists(&self, user_id: Uuid, registration: &str) -> ServiceResult<bool> {
        let registration = normalize_registration(registration);
        Ok(self.store.vehicle_exists(user_id, &registration).await?)
    }

    /// Apply a sparse patch to one of the caller's vehicles.
    pub async fn update(&self, user_id: Uuid, registration: &str, patch: VehiclePatch) -> ServiceResult<Vehicle> {
        let patch = patch.normalized();
        if patch.mileage.is_some_and(|m| m < 0) {
            return Err(ServiceError::bad_request("mileage cannot be negative"));
        }

        if patch.is_empty() {
            return match self.empty_patch {
                EmptyPatchPolicy::Reject => Err(ServiceError::bad_request("no fields to update")),
                EmptyPatchPolicy::Ignore => self.get(user_id, registration).await,
            };
        }

        let registration = normalize_registration(registration);
        let vehicle = self
            .store
            .update_vehicle(user_id, &registration, &patch)
            .await?
            .ok_or_else(|| ServiceError::not_found("vehicle not found"))?;

        tracing::info!(user_id = %user_id, vehicle_id = %vehicle.id, "Updated vehicle");
        Ok(vehicle)
    }

    pub async fn upload_image(&self, user_id: Uuid, vehicle_id: Uuid, upload: Upload) -> ServiceResult<Media> {
        self.media
            .attach(user_id, MediaParent::Vehicle(vehicle_id), upload)
            .await
    }
}
