// handlers/protected/garage.rs - Garage endpoints
//
// Every lookup is scoped to the caller: another user's registration reads
// as missing, not forbidden.

use axum::{
    extract::{
        multipart::Multipart,
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{MediaItem, NewVehicle, Vehicle, VehiclePatch};
use crate::handlers::{file_field, json_body, path_param};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

pub fn garage_routes() -> Router<AppState> {
    // The image route shares the `:registration` segment name with its
    // siblings; the handler reads it as a vehicle id.
    Router::new()
        .route("/garage", get(garage_get))
        .route("/garage/vehicle", post(vehicle_post))
        .route("/garage/vehicle/:registration", get(vehicle_get).patch(vehicle_patch))
        .route("/garage/vehicle/:registration/exists", get(vehicle_exists_get))
        .route("/garage/vehicle/:registration/uploadImage", post(vehicle_image_post))
}

pub async fn garage_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<Vehicle>> {
    let vehicles = state.garage.list(auth.user_id).await?;
    Ok(ApiResponse::success(vehicles))
}

pub async fn vehicle_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<NewVehicle>, JsonRejection>,
) -> ApiResult<CreatedResponse> {
    let vehicle = json_body(payload)?;
    let id = state.garage.add(auth.user_id, vehicle).await?;
    Ok(ApiResponse::created(CreatedResponse { id }))
}

pub async fn vehicle_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    registration: Result<Path<String>, PathRejection>,
) -> ApiResult<Vehicle> {
    let registration = path_param(registration)?;
    let vehicle = state.garage.get(auth.user_id, &registration).await?;
    Ok(ApiResponse::success(vehicle))
}

pub async fn vehicle_patch(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    registration: Result<Path<String>, PathRejection>,
    payload: Result<Json<VehiclePatch>, JsonRejection>,
) -> ApiResult<Vehicle> {
    let registration = path_param(registration)?;
    let patch = json_body(payload)?;
    let vehicle = state.garage.update(auth.user_id, &registration, patch).await?;
    Ok(ApiResponse::success(vehicle))
}

pub async fn vehicle_exists_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    registration: Result<Path<String>, PathRejection>,
) -> ApiResult<bool> {
    let registration = path_param(registration)?;
    let exists = state.garage.exists(auth.user_id, &registration).await?;
    Ok(ApiResponse::success(exists))
}

pub async fn vehicle_image_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    vehicle_id: Result<Path<Uuid>, PathRejection>,
    mut multipart: Multipart,
) -> ApiResult<MediaItem> {
    let vehicle_id = path_param(vehicle_id)?;
    let upload = file_field(&mut multipart, "image").await?;
    let media = state.garage.upload_image(auth.user_id, vehicle_id, upload).await?;
    Ok(ApiResponse::created(media.item()))
}
