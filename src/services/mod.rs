//! Domain services. Every ownership and uniqueness rule lives here; handlers
//! only translate HTTP in and out.

pub mod account;
pub mod enrichment;
pub mod follower;
pub mod garage;
pub mod logbook;
pub mod media;
pub mod profile;
pub mod storage;

pub use account::{AccountService, LoginOutcome, RegisterRequest};
pub use enrichment::{EnrichmentError, VehicleLookup, VehicleRecord};
pub use follower::FollowerService;
pub use garage::GarageService;
pub use logbook::LogbookService;
pub use media::{MediaService, Upload};
pub use profile::ProfileService;
pub use storage::{HttpObjectStorage, ObjectStorage, StorageError};

use crate::auth::{PasswordError, TokenError};
use crate::database::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Retryable: an upstream dependency timed out or is down.
    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    BadGateway(String),

    #[error("{0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ServiceError::BadRequest(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ServiceError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ServiceError::Conflict(message.into())
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(constraint) => {
                tracing::debug!(constraint = %constraint, "Unique constraint rejected write");
                ServiceError::Conflict("resource already exists".to_string())
            }
            StoreError::NotFound(reference) => {
                tracing::debug!(reference = %reference, "Foreign key rejected write");
                ServiceError::NotFound("referenced resource not found".to_string())
            }
            StoreError::Decode(msg) => {
                tracing::error!("Row decode error: {}", msg);
                ServiceError::Internal("failed to read stored data".to_string())
            }
            StoreError::Sqlx(sqlx::Error::PoolTimedOut) => {
                tracing::error!("Database pool timed out");
                ServiceError::Unavailable("database temporarily unavailable".to_string())
            }
            StoreError::Sqlx(e) => {
                tracing::error!("Database error: {}", e);
                ServiceError::Internal("database error occurred".to_string())
            }
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Timeout(msg) | StorageError::Transport(msg) => {
                tracing::warn!("Object storage unavailable: {}", msg);
                ServiceError::Unavailable("object storage unavailable".to_string())
            }
            StorageError::Rejected { status } => {
                tracing::error!(status, "Object storage rejected upload");
                ServiceError::BadGateway("object storage rejected upload".to_string())
            }
            StorageError::Config(msg) => {
                tracing::error!("Object storage misconfigured: {}", msg);
                ServiceError::Internal("object storage misconfigured".to_string())
            }
        }
    }
}

impl From<EnrichmentError> for ServiceError {
    fn from(err: EnrichmentError) -> Self {
        match err {
            EnrichmentError::InvalidRegistration => {
                ServiceError::BadRequest("invalid registration number".to_string())
            }
            EnrichmentError::Timeout(msg) | EnrichmentError::Unavailable(msg) => {
                tracing::warn!("Vehicle registry unavailable: {}", msg);
                ServiceError::Unavailable("vehicle registry unavailable".to_string())
            }
            EnrichmentError::Decode(msg) => {
                tracing::error!("Vehicle registry payload rejected: {}", msg);
                ServiceError::BadGateway("vehicle registry returned an unexpected response".to_string())
            }
            EnrichmentError::Config(msg) => {
                tracing::error!("Vehicle registry misconfigured: {}", msg);
                ServiceError::Internal("vehicle registry misconfigured".to_string())
            }
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        tracing::error!("Password hashing failed: {}", err);
        ServiceError::Internal("failed to process credentials".to_string())
    }
}

impl From<TokenError> for ServiceError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => ServiceError::Forbidden("invalid or expired token".to_string()),
            other => {
                tracing::error!("Token handling failed: {}", other);
                ServiceError::Internal("failed to process credentials".to_string())
            }
        }
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        tracing::error!("Blocking task failed: {}", err);
        ServiceError::Internal("internal task failed".to_string())
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors.field_errors().keys().map(|f| f.to_string()).collect();
        fields.sort();
        tracing::debug!("Rejected input: {}", errors);
        ServiceError::BadRequest(format!("invalid {}", fields.join(", ")))
    }
}
