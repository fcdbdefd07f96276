// handlers/public/auth/mod.rs - Public authentication handlers
//
// Token acquisition endpoints that do not require authentication.

use axum::{routing::post, Router};

use crate::AppState;

pub mod login; // POST /login - verify credentials, token in response header
pub mod register; // POST /register - create a new account

pub use login::login_post;
pub use register::register_post;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_post))
        .route("/login", post(login_post))
}
