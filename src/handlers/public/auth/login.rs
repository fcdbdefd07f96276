// handlers/public/auth/login.rs - POST /login handler

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::ACCESS_CONTROL_EXPOSE_HEADERS, HeaderMap, HeaderValue},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::{AppState, TOKEN_HEADER};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: Uuid,
}

/**
 * POST /login - Authenticate and receive a bearer token
 *
 * Input: `{ "email": "string", "password": "string" }`
 *
 * The token travels in the `X-Logbook-Token` response header (exposed to
 * browsers through `Access-Control-Expose-Headers`); the body carries only
 * `{ "userId": "..." }`. Unknown email and wrong password both answer
 * 400 with the same message.
 */
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let payload = json_body(payload)?;
    let outcome = state.accounts.login(&payload.email, &payload.password).await?;

    let token = HeaderValue::from_str(&outcome.token).map_err(|e| {
        tracing::error!("Issued token is not a valid header value: {}", e);
        ApiError::internal_server_error("failed to issue token")
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(TOKEN_HEADER, token);
    headers.insert(ACCESS_CONTROL_EXPOSE_HEADERS, HeaderValue::from_static(TOKEN_HEADER));

    Ok(ApiResponse::success(LoginResponse {
        user_id: outcome.user_id,
    })
    .with_headers(headers))
}
