// handlers/protected/logbook.rs - Logbook endpoints
//
// POST /log             create a log on one of the caller's vehicles
// GET  /log/:id         list a vehicle's logs (id is the vehicle id)
// POST /log/:id/media   multipart field `media` (id is the log id)

use axum::{
    extract::{
        multipart::Multipart,
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use super::garage::CreatedResponse;
use crate::database::models::{Log, MediaItem, NewLog};
use crate::handlers::{file_field, json_body, path_param};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::AppState;

pub fn logbook_routes() -> Router<AppState> {
    Router::new()
        .route("/log", post(log_post))
        .route("/log/:id", get(log_list_get))
        .route("/log/:id/media", post(log_media_post))
}

pub async fn log_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<NewLog>, JsonRejection>,
) -> ApiResult<CreatedResponse> {
    let log = json_body(payload)?;
    let id = state.logbook.create(auth.user_id, log).await?;
    Ok(ApiResponse::created(CreatedResponse { id }))
}

pub async fn log_list_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    vehicle_id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Vec<Log>> {
    let vehicle_id = path_param(vehicle_id)?;
    let logs = state.logbook.list(auth.user_id, vehicle_id).await?;
    Ok(ApiResponse::success(logs))
}

pub async fn log_media_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    log_id: Result<Path<Uuid>, PathRejection>,
    mut multipart: Multipart,
) -> ApiResult<MediaItem> {
    let log_id = path_param(log_id)?;
    let upload = file_field(&mut multipart, "media").await?;
    let media = state.logbook.upload_media(auth.user_id, log_id, upload).await?;
    Ok(ApiResponse::created(media.item()))
}
