//! Store contracts, one trait per entity family.
//!
//! Ownership is not checked here: stores answer questions about rows. The
//! services layer decides who may ask them.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::models::{
    Follower, Log, Media, NewLog, NewProfile, NewUser, NewVehicle, Profile, ProfileChanges, User,
    Vehicle, VehiclePatch,
};

/// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE for foreign_key_violation
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Row decode error: {0}")]
    Decode(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) => match db.code().as_deref() {
                Some(UNIQUE_VIOLATION) => StoreError::Conflict(
                    db.constraint().unwrap_or("unique constraint").to_string(),
                ),
                Some(FOREIGN_KEY_VIOLATION) => StoreError::NotFound(
                    db.constraint().unwrap_or("referenced row").to_string(),
                ),
                _ => StoreError::Sqlx(err),
            },
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
                StoreError::Decode(err.to_string())
            }
            _ => StoreError::Sqlx(err),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn get_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    /// Fails with `Conflict` when the email is taken.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile_by_user_id(&self, user_id: Uuid) -> StoreResult<Option<Profile>>;
    /// Fails with `Conflict` when the user already has a profile or the
    /// username is taken.
    async fn create_profile(&self, profile: NewProfile) -> StoreResult<Profile>;
    /// Returns `None` when the user has no profile.
    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: &ProfileChanges,
    ) -> StoreResult<Option<Profile>>;
    /// Returns `false` when the user has no profile.
    async fn update_avatar(&self, user_id: Uuid, avatar: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait FollowerStore: Send + Sync {
    async fn get_follower(&self, follower_id: Uuid, following_id: Uuid) -> StoreResult<Option<Follower>>;
    /// Fails with `Conflict` when the edge already exists.
    async fn follow_user(&self, follower_id: Uuid, following_id: Uuid) -> StoreResult<Follower>;
    /// Returns `false` when there was no edge to remove.
    async fn unfollow_user(&self, follower_id: Uuid, following_id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait GarageStore: Send + Sync {
    async fn get_vehicle_by_id(&self, id: Uuid) -> StoreResult<Option<Vehicle>>;
    async fn list_user_vehicles(&self, user_id: Uuid) -> StoreResult<Vec<Vehicle>>;
    async fn get_vehicle_by_registration(
        &self,
        user_id: Uuid,
        registration: &str,
    ) -> StoreResult<Option<Vehicle>>;
    async fn vehicle_exists(&self, user_id: Uuid, registration: &str) -> StoreResult<bool>;
    /// Fails with `Conflict` when (user, registration) already exists.
    async fn add_vehicle(&self, user_id: Uuid, vehicle: &NewVehicle) -> StoreResult<Uuid>;
    /// Applies present patch fields. Returns `None` when no vehicle matches.
    async fn update_vehicle(
        &self,
        user_id: Uuid,
        registration: &str,
        patch: &VehiclePatch,
    ) -> StoreResult<Option<Vehicle>>;
}

#[async_trait]
pub trait LogbookStore: Send + Sync {
    async fn get_log_by_id(&self, id: Uuid) -> StoreResult<Option<Log>>;
    async fn create_log(&self, log: &NewLog) -> StoreResult<Uuid>;
    /// Newest first, each with its media attached.
    async fn list_logs_for_vehicle(&self, vehicle_id: Uuid) -> StoreResult<Vec<Log>>;
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn add_media(&self, media: &Media) -> StoreResult<()>;
}

/// Every store family behind one handle, so a single backend can be shared.
pub trait Store:
    UserStore + ProfileStore + FollowerStore + GarageStore + LogbookStore + MediaStore
{
}

impl<T> Store for T where
    T: UserStore + ProfileStore + FollowerStore + GarageStore + LogbookStore + MediaStore
{
}
