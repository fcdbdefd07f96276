// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer token resolved by require_auth)
//
// Handlers stay thin: decode the request, call one service, wrap the result
// in the success envelope. Every rule lives in `services`.
pub mod protected; // Tier 2: bearer token required
pub mod public; // Tier 1: no authentication (/register, /login)

use axum::extract::{
    multipart::Multipart,
    rejection::{JsonRejection, PathRejection},
    Json, Path,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::services::Upload;

/// Unwrap a JSON body, answering malformed input in the error envelope.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        tracing::debug!("Rejected JSON body: {}", rejection.body_text());
        ApiError::bad_request(format!("invalid request body: {}", rejection.body_text()))
    })
}

/// Unwrap a path parameter, answering malformed input in the error envelope.
pub(crate) fn path_param<T: DeserializeOwned + Send>(
    param: Result<Path<T>, PathRejection>,
) -> Result<T, ApiError> {
    param
        .map(|Path(value)| value)
        .map_err(|rejection| ApiError::bad_request(format!("invalid path parameter: {}", rejection.body_text())))
}

/// Read the first multipart field called `name` as an upload.
pub(crate) async fn file_field(multipart: &mut Multipart, name: &str) -> Result<Upload, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(name) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        return Ok(Upload::new(filename, content_type, bytes.to_vec()));
    }

    Err(ApiError::bad_request(format!("missing form field '{}'", name)))
}
