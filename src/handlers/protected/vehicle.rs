// handlers/protected/vehicle.rs - Registry lookup

use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Extension, Router,
};

use crate::handlers::path_param;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{ServiceError, VehicleRecord};
use crate::AppState;

pub fn vehicle_routes() -> Router<AppState> {
    Router::new().route("/vehicle/lookup/:registration", get(lookup_get))
}

/// GET /vehicle/lookup/:registration - reconciled DVLA + DVSA record,
/// shaped like an add-vehicle payload.
pub async fn lookup_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    registration: Result<Path<String>, PathRejection>,
) -> ApiResult<VehicleRecord> {
    let registration = path_param(registration)?;
    tracing::debug!(user_id = %auth.user_id, registration = %registration, "Vehicle lookup");

    let record = state
        .lookup
        .lookup(&registration)
        .await
        .map_err(ServiceError::from)?;
    Ok(ApiResponse::success(record))
}
