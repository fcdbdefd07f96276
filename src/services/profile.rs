use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use super::media::{MediaService, Upload};
use super::{ServiceError, ServiceResult};
use crate::database::models::{NewProfile, Profile, ProfileChanges};
use crate::database::store::{FollowerStore, ProfileStore};
use crate::database::{Store, StoreError};

#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn Store>,
    media: MediaService,
}

impl ProfileService {
    pub fn new(store: Arc<dyn Store>, media: MediaService) -> Self {
        Self { store, media }
    }

    pub async fn create(&self, user_id: Uuid, username: &str, name: &str) -> ServiceResult<Profile> {
        let profile = NewProfile {
            user_id,
            username: username.trim().to_string(),
            name: name.trim().to_string(),
        };
        profile.validate()?;

        if self.store.get_profile_by_user_id(user_id).await?.is_some() {
            return Err(ServiceError::conflict("profile already exists"));
        }

        let profile = self
            .store
            .create_profile(profile)
            .await
            .map_err(username_conflict)?;

        tracing::info!(user_id = %user_id, "Created profile");
        Ok(profile)
    }

    pub async fn get_own(&self, user_id: Uuid) -> ServiceResult<Profile> {
        self.store
            .get_profile_by_user_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("profile not found"))
    }

    /// Profile of `target` as seen by `viewer`. Private profiles are only
    /// shown to their owner and to users following them.
    pub async fn get_for_viewer(&self, viewer: Uuid, target: Uuid) -> ServiceResult<Profile> {
        let profile = self
            .store
            .get_profile_by_user_id(target)
            .await?
            .ok_or_else(|| ServiceError::not_found("user not found"))?;

        if profile.public || viewer == target {
            return Ok(profile);
        }

        match self.store.get_follower(viewer, target).await? {
            Some(_) => Ok(profile),
            None => Err(ServiceError::forbidden("profile is private")),
        }
    }

    /// Sparse update. Empty text fields count as absent.
    pub async fn update(&self, user_id: Uuid, changes: ProfileChanges) -> ServiceResult<Profile> {
        let changes = ProfileChanges {
            username: present(changes.username),
            name: present(changes.name),
            bio: present(changes.bio),
            public: changes.public,
        };
        changes.validate()?;

        if changes.is_empty() {
            return self.get_own(user_id).await;
        }

        self.store
            .update_profile(user_id, &changes)
            .await
            .map_err(username_conflict)?
            .ok_or_else(|| ServiceError::not_found("profile not found"))
    }

    /// Upload a new avatar and point the profile at it.
    pub async fn upload_avatar(&self, user_id: Uuid, upload: Upload) -> ServiceResult<String> {
        if self.store.get_profile_by_user_id(user_id).await?.is_none() {
            return Err(ServiceError::not_found("profile not found"));
        }

        let prefix = format!("avatars/user/{}", user_id);
        let (_, location) = self.media.put_object(&prefix, upload).await?;

        if !self.store.update_avatar(user_id, &location).await? {
            return Err(ServiceError::not_found("profile not found"));
        }
        Ok(location)
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn username_conflict(err: StoreError) -> ServiceError {
    match err {
        StoreError::Conflict(_) => ServiceError::conflict("username already taken"),
        other => other.into(),
    }
}
