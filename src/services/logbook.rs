use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use super::media::{MediaService, Upload};
use super::{ServiceError, ServiceResult};
use crate::database::models::{Log, Media, MediaParent, NewLog, Vehicle};
use crate::database::store::{GarageStore, LogbookStore};
use crate::database::Store;

/// Per-vehicle logbook. Ownership of a log is ownership of its vehicle.
#[derive(Clone)]
pub struct LogbookService {
    store: Arc<dyn Store>,
    media: MediaService,
}

impl LogbookService {
    pub fn new(store: Arc<dyn Store>, media: MediaService) -> Self {
        Self { store, media }
    }

    /// Load the vehicle and make sure `user_id` owns it.
    async fn owned_vehicle(&self, user_id: Uuid, vehicle_id: Uuid) -> ServiceResult<Vehicle> {
        let vehicle = self
            .store
            .get_vehicle_by_id(vehicle_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("vehicle not found"))?;

        if vehicle.user_id != user_id {
            tracing::warn!(user_id = %user_id, vehicle_id = %vehicle_id, "Logbook access to foreign vehicle");
            return Err(ServiceError::forbidden("vehicle belongs to another user"));
        }
        Ok(vehicle)
    }

    pub async fn create(&self, user_id: Uuid, log: NewLog) -> ServiceResult<Uuid> {
        let log = NewLog {
            category: log.category.trim().to_string(),
            title: log.title.trim().to_string(),
            ..log
        };
        log.validate()?;

        self.owned_vehicle(user_id, log.vehicle_id).await?;

        let id = self.store.create_log(&log).await?;
        tracing::info!(user_id = %user_id, vehicle_id = %log.vehicle_id, log_id = %id, "Created log");
        Ok(id)
    }

    /// Newest first, each with its media.
    pub async fn list(&self, user_id: Uuid, vehicle_id: Uuid) -> ServiceResult<Vec<Log>> {
        self.owned_vehicle(user_id, vehicle_id).await?;
        Ok(self.store.list_logs_for_vehicle(vehicle_id).await?)
    }

    pub async fn upload_media(&self, user_id: Uuid, log_id: Uuid, upload: Upload) -> ServiceResult<Media> {
        self.media
            .attach(user_id, MediaParent::Log(log_id), upload)
            .await
    }
}
