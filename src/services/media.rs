use std::sync::Arc;

use uuid::Uuid;

use super::storage::{sanitize_filename, ObjectStorage};
use super::{ServiceError, ServiceResult};
use crate::database::models::{Media, MediaParent};
use crate::database::store::{GarageStore, LogbookStore, MediaStore};
use crate::database::Store;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// One uploaded file as received from a multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            bytes,
        }
    }
}

/// Uploads bytes to object storage and records them against a parent.
#[derive(Clone)]
pub struct MediaService {
    store: Arc<dyn Store>,
    storage: Arc<dyn ObjectStorage>,
}

impl MediaService {
    pub fn new(store: Arc<dyn Store>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { store, storage }
    }

    /// Put the upload under `{prefix}/{file}` and return (file, location).
    pub async fn put_object(&self, prefix: &str, upload: Upload) -> ServiceResult<(String, String)> {
        if upload.bytes.is_empty() {
            return Err(ServiceError::bad_request("uploaded file is empty"));
        }

        let filename = sanitize_filename(&upload.filename);
        let key = format!("{}/{}", prefix, filename);
        let location = self
            .storage
            .put(&key, &upload.content_type, upload.bytes)
            .await?;

        tracing::info!(key = %key, "Stored object");
        Ok((filename, location))
    }

    /// Upload and attach media to a vehicle or log.
    ///
    /// The parent must exist. The row is only written once the upload has
    /// succeeded, so a failed upload leaves no trace.
    pub async fn attach(&self, user_id: Uuid, parent: MediaParent, upload: Upload) -> ServiceResult<Media> {
        let prefix = match parent {
            MediaParent::Vehicle(id) => {
                if self.store.get_vehicle_by_id(id).await?.is_none() {
                    return Err(ServiceError::not_found("vehicle not found"));
                }
                format!("vehicles/{}/images", id)
            }
            MediaParent::Log(id) => {
                if self.store.get_log_by_id(id).await?.is_none() {
                    return Err(ServiceError::not_found("log not found"));
                }
                format!("logbook/{}/media", id)
            }
        };

        let content_type = upload.content_type.clone();
        let (filename, location) = self.put_object(&prefix, upload).await?;

        let media = Media::new(user_id, parent, filename, content_type, location);
        self.store.add_media(&media).await?;
        Ok(media)
    }
}
