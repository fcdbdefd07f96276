use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

/// Identity of the caller, attached to the request by [`require_auth`].
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Bearer token middleware for every protected route.
///
/// Validates the token, then resolves its subject to a user that still
/// exists. Any failure answers 403 before the handler runs.
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_headers(&headers).map_err(|msg| {
        tracing::debug!("Rejected request without usable token: {}", msg);
        ApiError::forbidden("permission denied")
    })?;

    let user = state.accounts.authenticate(token).await?;

    request.extensions_mut().insert(AuthUser {
        user_id: user.id,
        email: user.email,
    });

    Ok(next.run(request).await)
}

/// Accepts `Authorization: Bearer <token>` or a bare token.
fn extract_token_from_headers(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?
        .trim();

    if auth_str.eq_ignore_ascii_case("bearer") {
        return Err("Empty token");
    }

    let token = match auth_str.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        Some(_) => return Err("Unsupported Authorization scheme"),
        None => auth_str,
    };

    if token.is_empty() {
        return Err("Empty token");
    }
    Ok(token)
}
