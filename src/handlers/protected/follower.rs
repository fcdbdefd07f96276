// handlers/protected/follower.rs - Follow graph endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::Follower;
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::AppState;

/// Body for both endpoints: the user being (un)followed.
#[derive(Debug, Deserialize)]
pub struct FollowRequest {
    #[serde(rename = "userId", alias = "user_id", alias = "id")]
    pub user_id: Uuid,
}

pub fn follower_routes() -> Router<AppState> {
    Router::new()
        .route("/follow", post(follow_post))
        .route("/unfollow", post(unfollow_post))
}

pub async fn follow_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<FollowRequest>, JsonRejection>,
) -> ApiResult<Follower> {
    let payload = json_body(payload)?;
    let edge = state.followers.follow(auth.user_id, payload.user_id).await?;
    Ok(ApiResponse::created(edge))
}

pub async fn unfollow_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<FollowRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let payload = json_body(payload)?;
    state.followers.unfollow(auth.user_id, payload.user_id).await?;
    Ok(ApiResponse::success(json!({ "unfollowed": payload.user_id })))
}
