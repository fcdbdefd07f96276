// handlers/public/auth/register.rs - POST /register handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::database::models::User;
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::RegisterRequest;
use crate::AppState;

/// POST /register - create an account. Email is stored lower-cased;
/// a second account for the same email answers 409.
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<User> {
    let payload = json_body(payload)?;
    let user = state.accounts.register(payload).await?;
    Ok(ApiResponse::created(user))
}
