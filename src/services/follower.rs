use std::sync::Arc;

use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::database::models::Follower;
use crate::database::store::{FollowerStore, UserStore};
use crate::database::{Store, StoreError};

#[derive(Clone)]
pub struct FollowerService {
    store: Arc<dyn Store>,
}

impl FollowerService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// `actor` starts following `target`.
    pub async fn follow(&self, actor: Uuid, target: Uuid) -> ServiceResult<Follower> {
        if actor == target {
            return Err(ServiceError::forbidden("cannot follow yourself"));
        }
        if self.store.get_user_by_id(target).await?.is_none() {
            return Err(ServiceError::not_found("user not found"));
        }
        if self.store.get_follower(actor, target).await?.is_some() {
            return Err(ServiceError::conflict("already following user"));
        }

        let edge = self
            .store
            .follow_user(actor, target)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => ServiceError::conflict("already following user"),
                other => other.into(),
            })?;

        tracing::info!(follower = %actor, following = %target, "Followed user");
        Ok(edge)
    }

    pub async fn unfollow(&self, actor: Uuid, target: Uuid) -> ServiceResult<()> {
        if actor == target {
            return Err(ServiceError::forbidden("cannot unfollow yourself"));
        }
        if !self.store.unfollow_user(actor, target).await? {
            return Err(ServiceError::not_found("not following user"));
        }

        tracing::info!(follower = %actor, following = %target, "Unfollowed user");
        Ok(())
    }
}
