use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Public profile with follower counts computed at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub name: String,
    pub bio: String,
    pub avatar: String,
    pub public: bool,
    pub followers: i64,
    pub following: i64,
}

#[derive(Debug, Clone, Validate)]
pub struct NewProfile {
    pub user_id: Uuid,
    #[validate(length(min = 3, max = 100))]
    pub username: String,
    #[validate(length(min = 3, max = 100))]
    pub name: String,
}

/// Sparse profile update; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct ProfileChanges {
    #[validate(length(min = 3, max = 100))]
    pub username: Option<String>,
    #[validate(length(min = 3, max = 100))]
    pub name: Option<String>,
    pub bio: Option<String>,
    pub public: Option<bool>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.name.is_none() && self.bio.is_none() && self.public.is_none()
    }
}
