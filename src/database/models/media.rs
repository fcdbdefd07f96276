use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The single owner of a media row. A row never points at both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum MediaParent {
    Vehicle(Uuid),
    Log(Uuid),
}

impl MediaParent {
    pub fn vehicle_id(&self) -> Option<Uuid> {
        match self {
            MediaParent::Vehicle(id) => Some(*id),
            MediaParent::Log(_) => None,
        }
    }

    pub fn log_id(&self) -> Option<Uuid> {
        match self {
            MediaParent::Log(id) => Some(*id),
            MediaParent::Vehicle(_) => None,
        }
    }
}

/// Media as nested under its parent in API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: Uuid,
    pub filename: String,
    pub file_type: String,
    pub location: String,
}

/// Full media record, written once after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub id: Uuid,
    pub user_id: Uuid,
    pub parent: MediaParent,
    pub filename: String,
    pub file_type: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

impl Media {
    pub fn new(
        user_id: Uuid,
        parent: MediaParent,
        filename: impl Into<String>,
        file_type: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            parent,
            filename: filename.into(),
            file_type: file_type.into(),
            location: location.into(),
            created_at: Utc::now(),
        }
    }

    pub fn item(&self) -> MediaItem {
        MediaItem {
            id: self.id,
            filename: self.filename.clone(),
            file_type: self.file_type.clone(),
            location: self.location.clone(),
        }
    }
}
