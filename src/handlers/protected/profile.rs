// handlers/protected/profile.rs - Profile endpoints
//
// POST /self         create the caller's profile
// PUT  /self         sparse update
// GET  /self         read own profile
// POST /self/avatar  multipart field `avatar`
// GET  /user/:id     read another user's profile (visibility rules apply)

use axum::{
    extract::{
        multipart::Multipart,
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Profile, ProfileChanges};
use crate::handlers::{file_field, json_body, path_param};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub username: String,
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub public: Option<bool>,
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(req: UpdateProfileRequest) -> Self {
        ProfileChanges {
            username: req.username,
            name: req.name,
            bio: req.bio,
            public: req.public,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    pub avatar: String,
}

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/self", post(self_post).put(self_put).get(self_get))
        .route("/self/avatar", post(avatar_post))
        .route("/user/:id", get(user_get))
}

pub async fn self_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<CreateProfileRequest>, JsonRejection>,
) -> ApiResult<Profile> {
    let payload = json_body(payload)?;
    let profile = state
        .profiles
        .create(auth.user_id, &payload.username, &payload.name)
        .await?;
    Ok(ApiResponse::created(profile))
}

pub async fn self_put(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> ApiResult<Profile> {
    let changes: ProfileChanges = json_body(payload)?.into();
    let profile = state.profiles.update(auth.user_id, changes).await?;
    Ok(ApiResponse::success(profile))
}

pub async fn self_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Profile> {
    let profile = state.profiles.get_own(auth.user_id).await?;
    Ok(ApiResponse::success(profile))
}

pub async fn avatar_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    mut multipart: Multipart,
) -> ApiResult<AvatarResponse> {
    let upload = file_field(&mut multipart, "avatar").await?;
    let avatar = state.profiles.upload_avatar(auth.user_id, upload).await?;
    Ok(ApiResponse::success(AvatarResponse { avatar }))
}

pub async fn user_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Profile> {
    let target = path_param(id)?;
    let profile = state.profiles.get_for_viewer(auth.user_id, target).await?;
    Ok(ApiResponse::success(profile))
}
