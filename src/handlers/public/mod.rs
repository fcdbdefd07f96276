// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition: account registration and login. Everything else under
// /api/v1 sits behind require_auth.

pub mod auth;

pub use auth::auth_routes;
