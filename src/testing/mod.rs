//! In-memory stand-ins for the database, object storage and vehicle registry.
//!
//! `MemoryStore` enforces the same uniqueness and reference rules as the
//! relational schema and builds its nested reads through the same
//! [`collapse`](crate::database::aggregate::collapse) as the Postgres store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::aggregate::{collapse, Joined};
use crate::database::models::{
    Follower, Log, Media, MediaParent, NewLog, NewProfile, NewUser, NewVehicle, Profile,
    ProfileChanges, User, Vehicle, VehiclePatch,
};
use crate::database::store::{
    FollowerStore, GarageStore, LogbookStore, MediaStore, ProfileStore, StoreError, StoreResult,
    UserStore,
};
use crate::services::enrichment::{
    EnrichmentError, MotHistory, MotHistorySource, VehicleFacts, VehicleFactsSource,
};
use crate::services::storage::{ObjectStorage, StorageError};

#[derive(Debug, Clone)]
struct ProfileRow {
    id: Uuid,
    user_id: Uuid,
    username: String,
    name: String,
    bio: String,
    avatar: String,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    profiles: Vec<ProfileRow>,
    followers: Vec<Follower>,
    vehicles: Vec<Vehicle>,
    logs: Vec<Log>,
    media: Vec<Media>,
}

impl Tables {
    fn user_exists(&self, id: Uuid) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    fn profile_view(&self, row: &ProfileRow) -> Option<Profile> {
        let user = self.users.iter().find(|u| u.id == row.user_id)?;
        Some(Profile {
            id: row.id,
            user_id: row.user_id,
            username: row.username.clone(),
            name: row.name.clone(),
            bio: row.bio.clone(),
            avatar: row.avatar.clone(),
            public: user.public,
            followers: self.followers.iter().filter(|f| f.following_id == row.user_id).count() as i64,
            following: self.followers.iter().filter(|f| f.follower_id == row.user_id).count() as i64,
        })
    }

    /// Emulates `vehicles LEFT JOIN media`, one row per pair.
    fn vehicle_rows<'a>(
        &'a self,
        vehicles: impl Iterator<Item = &'a Vehicle>,
    ) -> Vec<StoreResult<Joined<Vehicle>>> {
        let mut rows = Vec::new();
        for vehicle in vehicles {
            let mut attached = self
                .media
                .iter()
                .filter(|m| m.parent == MediaParent::Vehicle(vehicle.id))
                .peekable();
            if attached.peek().is_none() {
                rows.push(Ok(Joined::new(vehicle.clone(), None)));
            }
            for media in attached {
                rows.push(Ok(Joined::new(vehicle.clone(), Some(media.item()))));
            }
        }
        rows
    }

    /// Emulates `logs LEFT JOIN media`, one row per pair.
    fn log_rows<'a>(&'a self, logs: impl Iterator<Item = &'a Log>) -> Vec<StoreResult<Joined<Log>>> {
        let mut rows = Vec::new();
        for log in logs {
            let mut attached = self
                .media
                .iter()
                .filter(|m| m.parent == MediaParent::Log(log.id))
                .peekable();
            if attached.peek().is_none() {
                rows.push(Ok(Joined::new(log.clone(), None)));
            }
            for media in attached {
                rows.push(Ok(Joined::new(log.clone(), Some(media.item()))));
            }
        }
        rows
    }
}

/// Every store trait over in-process tables.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    stale_reads: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose existence reads (`vehicle_exists`, `get_follower`)
    /// never see committed rows, as when a concurrent insert lands between
    /// a service's check and its write. Only the uniqueness constraints on
    /// insert can catch the duplicate.
    pub fn racing() -> Self {
        Self {
            stale_reads: true,
            ..Self::default()
        }
    }

    /// Insert a public user without a usable password.
    pub async fn seed_user(&self, email: &str) -> Uuid {
        let mut tables = self.tables.write().await;
        let id = Uuid::new_v4();
        tables.users.push(User {
            id,
            email: email.to_string(),
            password_hash: String::new(),
            public: true,
            created_at: Utc::now(),
        });
        id
    }

    /// Delete a user and everything that references it.
    pub async fn remove_user(&self, user_id: Uuid) {
        let mut tables = self.tables.write().await;
        let vehicle_ids: Vec<Uuid> = tables
            .vehicles
            .iter()
            .filter(|v| v.user_id == user_id)
            .map(|v| v.id)
            .collect();
        let log_ids: Vec<Uuid> = tables
            .logs
            .iter()
            .filter(|l| vehicle_ids.contains(&l.vehicle_id))
            .map(|l| l.id)
            .collect();

        tables.media.retain(|m| {
            m.user_id != user_id
                && !m.parent.vehicle_id().is_some_and(|id| vehicle_ids.contains(&id))
                && !m.parent.log_id().is_some_and(|id| log_ids.contains(&id))
        });
        tables.logs.retain(|l| !log_ids.contains(&l.id));
        tables.vehicles.retain(|v| v.user_id != user_id);
        tables
            .followers
            .retain(|f| f.follower_id != user_id && f.following_id != user_id);
        tables.profiles.retain(|p| p.user_id != user_id);
        tables.users.retain(|u| u.id != user_id);
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }

        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            public: true,
            created_at: Utc::now(),
        };
        tables.users.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile_by_user_id(&self, user_id: Uuid) -> StoreResult<Option<Profile>> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .and_then(|row| tables.profile_view(row)))
    }

    async fn create_profile(&self, profile: NewProfile) -> StoreResult<Profile> {
        let mut tables = self.tables.write().await;
        if !tables.user_exists(profile.user_id) {
            return Err(StoreError::NotFound("profiles_user_id_fkey".to_string()));
        }
        if tables.profiles.iter().any(|p| p.user_id == profile.user_id) {
            return Err(StoreError::Conflict("profiles_user_id_key".to_string()));
        }
        if tables.profiles.iter().any(|p| p.username == profile.username) {
            return Err(StoreError::Conflict("profiles_username_key".to_string()));
        }

        let row = ProfileRow {
            id: Uuid::new_v4(),
            user_id: profile.user_id,
            username: profile.username,
            name: profile.name,
            bio: String::new(),
            avatar: String::new(),
        };
        tables.profiles.push(row.clone());
        tables
            .profile_view(&row)
            .ok_or_else(|| StoreError::NotFound("users".to_string()))
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: &ProfileChanges,
    ) -> StoreResult<Option<Profile>> {
        let mut tables = self.tables.write().await;
        if let Some(username) = &changes.username {
            if tables
                .profiles
                .iter()
                .any(|p| &p.username == username && p.user_id != user_id)
            {
                return Err(StoreError::Conflict("profiles_username_key".to_string()));
            }
        }

        let Some(row) = tables.profiles.iter_mut().find(|p| p.user_id == user_id) else {
            return Ok(None);
        };
        if let Some(username) = &changes.username {
            row.username = username.clone();
        }
        if let Some(name) = &changes.name {
            row.name = name.clone();
        }
        if let Some(bio) = &changes.bio {
            row.bio = bio.clone();
        }
        let row = row.clone();

        if let Some(public) = changes.public {
            if let Some(user) = tables.users.iter_mut().find(|u| u.id == user_id) {
                user.public = public;
            }
        }

        Ok(tables.profile_view(&row))
    }

    async fn update_avatar(&self, user_id: Uuid, avatar: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.profiles.iter_mut().find(|p| p.user_id == user_id) {
            Some(row) => {
                row.avatar = avatar.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl FollowerStore for MemoryStore {
    async fn get_follower(&self, follower_id: Uuid, following_id: Uuid) -> StoreResult<Option<Follower>> {
        if self.stale_reads {
            return Ok(None);
        }
        let tables = self.tables.read().await;
        Ok(tables
            .followers
            .iter()
            .find(|f| f.follower_id == follower_id && f.following_id == following_id)
            .cloned())
    }

    async fn follow_user(&self, follower_id: Uuid, following_id: Uuid) -> StoreResult<Follower> {
        let mut tables = self.tables.write().await;
        if !tables.user_exists(follower_id) || !tables.user_exists(following_id) {
            return Err(StoreError::NotFound("followers_user_fkey".to_string()));
        }
        if tables
            .followers
            .iter()
            .any(|f| f.follower_id == follower_id && f.following_id == following_id)
        {
            return Err(StoreError::Conflict("followers_pair_unique".to_string()));
        }

        let edge = Follower {
            id: Uuid::new_v4(),
            follower_id,
            following_id,
            created_at: Utc::now(),
        };
        tables.followers.push(edge.clone());
        Ok(edge)
    }

    async fn unfollow_user(&self, follower_id: Uuid, following_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.followers.len();
        tables
            .followers
            .retain(|f| !(f.follower_id == follower_id && f.following_id == following_id));
        Ok(tables.followers.len() < before)
    }
}

#[async_trait]
impl GarageStore for MemoryStore {
    async fn get_vehicle_by_id(&self, id: Uuid) -> StoreResult<Option<Vehicle>> {
        let tables = self.tables.read().await;
        let rows = tables.vehicle_rows(tables.vehicles.iter().filter(|v| v.id == id));
        Ok(collapse(rows)?.into_iter().next())
    }

    async fn list_user_vehicles(&self, user_id: Uuid) -> StoreResult<Vec<Vehicle>> {
        let tables = self.tables.read().await;
        let rows = tables.vehicle_rows(tables.vehicles.iter().filter(|v| v.user_id == user_id));
        collapse(rows)
    }

    async fn get_vehicle_by_registration(
        &self,
        user_id: Uuid,
        registration: &str,
    ) -> StoreResult<Option<Vehicle>> {
        let tables = self.tables.read().await;
        let rows = tables.vehicle_rows(
            tables
                .vehicles
                .iter()
                .filter(|v| v.user_id == user_id && v.registration == registration),
        );
        Ok(collapse(rows)?.into_iter().next())
    }

    async fn vehicle_exists(&self, user_id: Uuid, registration: &str) -> StoreResult<bool> {
        if self.stale_reads {
            return Ok(false);
        }
        let tables = self.tables.read().await;
        Ok(tables
            .vehicles
            .iter()
            .any(|v| v.user_id == user_id && v.registration == registration))
    }

    async fn add_vehicle(&self, user_id: Uuid, vehicle: &NewVehicle) -> StoreResult<Uuid> {
        let mut tables = self.tables.write().await;
        if !tables.user_exists(user_id) {
            return Err(StoreError::NotFound("vehicles_user_id_fkey".to_string()));
        }
        if tables
            .vehicles
            .iter()
            .any(|v| v.user_id == user_id && v.registration == vehicle.registration)
        {
            return Err(StoreError::Conflict("vehicles_owner_registration_unique".to_string()));
        }

        let id = Uuid::new_v4();
        tables.vehicles.push(Vehicle {
            id,
            user_id,
            registration: vehicle.registration.clone(),
            make: vehicle.make.clone(),
            model: vehicle.model.clone(),
            year: vehicle.year,
            engine_size: vehicle.engine_size,
            color: vehicle.color.clone(),
            registered: vehicle.registered.clone(),
            tax_date: vehicle.tax_date.clone(),
            mot_date: vehicle.mot_date.clone(),
            insurance_date: vehicle.insurance_date.clone(),
            service_date: vehicle.service_date.clone(),
            description: vehicle.description.clone(),
            mileage: vehicle.mileage,
            nickname: vehicle.nickname.clone(),
            created_at: Utc::now(),
            media: Vec::new(),
        });
        Ok(id)
    }

    async fn update_vehicle(
        &self,
        user_id: Uuid,
        registration: &str,
        patch: &VehiclePatch,
    ) -> StoreResult<Option<Vehicle>> {
        {
            let mut tables = self.tables.write().await;
            let Some(vehicle) = tables
                .vehicles
                .iter_mut()
                .find(|v| v.user_id == user_id && v.registration == registration)
            else {
                return Ok(None);
            };
            patch.apply_to(vehicle);
        }
        self.get_vehicle_by_registration(user_id, registration).await
    }
}

#[async_trait]
impl LogbookStore for MemoryStore {
    async fn get_log_by_id(&self, id: Uuid) -> StoreResult<Option<Log>> {
        let tables = self.tables.read().await;
        let rows = tables.log_rows(tables.logs.iter().filter(|l| l.id == id));
        Ok(collapse(rows)?.into_iter().next())
    }

    async fn create_log(&self, log: &NewLog) -> StoreResult<Uuid> {
        let mut tables = self.tables.write().await;
        if !tables.vehicles.iter().any(|v| v.id == log.vehicle_id) {
            return Err(StoreError::NotFound("logs_vehicle_id_fkey".to_string()));
        }

        let id = Uuid::new_v4();
        tables.logs.push(Log {
            id,
            vehicle_id: log.vehicle_id,
            category: log.category.clone(),
            title: log.title.clone(),
            date: log.date,
            description: log.description.clone(),
            notes: log.notes.clone(),
            cost: log.cost,
            created_at: Utc::now(),
            media: Vec::new(),
        });
        Ok(id)
    }

    async fn list_logs_for_vehicle(&self, vehicle_id: Uuid) -> StoreResult<Vec<Log>> {
        let tables = self.tables.read().await;
        // Insertion order reversed stands in for created_at DESC.
        let rows = tables.log_rows(tables.logs.iter().rev().filter(|l| l.vehicle_id == vehicle_id));
        collapse(rows)
    }
}

#[async_trait]
impl MediaStore for MemoryStore {
    async fn add_media(&self, media: &Media) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.user_exists(media.user_id) {
            return Err(StoreError::NotFound("media_user_id_fkey".to_string()));
        }
        let parent_exists = match media.parent {
            MediaParent::Vehicle(id) => tables.vehicles.iter().any(|v| v.id == id),
            MediaParent::Log(id) => tables.logs.iter().any(|l| l.id == id),
        };
        if !parent_exists {
            return Err(StoreError::NotFound("media_parent_fkey".to_string()));
        }

        tables.media.push(media.clone());
        Ok(())
    }
}

/// Base URL reported for objects held by [`MemoryObjectStorage`].
pub const MEMORY_STORAGE_BASE: &str = "https://objects.test/logbook-app";

/// Object storage that keeps uploads in a map. A failing instance answers
/// every put with a timeout.
#[derive(Default)]
pub struct MemoryObjectStorage {
    objects: RwLock<HashMap<String, (String, Vec<u8>)>>,
    failing: bool,
}

impl MemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    pub async fn get(&self, key: &str) -> Option<(String, Vec<u8>)> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn put(&self, key: &str, content_type: &str, body: Vec<u8>) -> Result<String, StorageError> {
        if self.failing {
            return Err(StorageError::Timeout(format!("put {}", key)));
        }
        self.objects
            .write()
            .await
            .insert(key.to_string(), (content_type.to_string(), body));
        Ok(format!("{}/{}", MEMORY_STORAGE_BASE, key))
    }
}

/// Fixed registry answers keyed by normalized registration. Unknown
/// registrations are invalid.
#[derive(Default, Clone)]
pub struct StaticVehicleSource {
    vehicles: HashMap<String, (VehicleFacts, Vec<MotHistory>)>,
}

impl StaticVehicleSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vehicle(mut self, registration: &str, facts: VehicleFacts, history: Vec<MotHistory>) -> Self {
        self.vehicles
            .insert(registration.to_string(), (facts, history));
        self
    }
}

#[async_trait]
impl VehicleFactsSource for StaticVehicleSource {
    async fn vehicle_facts(&self, registration: &str) -> Result<VehicleFacts, EnrichmentError> {
        self.vehicles
            .get(registration)
            .map(|(facts, _)| facts.clone())
            .ok_or(EnrichmentError::InvalidRegistration)
    }
}

#[async_trait]
impl MotHistorySource for StaticVehicleSource {
    async fn mot_history(&self, registration: &str) -> Result<Vec<MotHistory>, EnrichmentError> {
        self.vehicles
            .get(registration)
            .map(|(_, history)| history.clone())
            .ok_or(EnrichmentError::InvalidRegistration)
    }
}
