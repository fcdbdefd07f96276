pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header::HeaderName, HeaderValue, Method, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::{DatabaseManager, Store};
use crate::services::{
    AccountService, FollowerService, GarageService, LogbookService, MediaService, ObjectStorage,
    ProfileService, VehicleLookup,
};

/// Response header carrying the bearer token issued at login.
pub const TOKEN_HEADER: &str = "x-logbook-token";

/// Everything a handler can reach. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub accounts: AccountService,
    pub profiles: ProfileService,
    pub followers: FollowerService,
    pub garage: GarageService,
    pub logbook: LogbookService,
    pub lookup: VehicleLookup,
    pool: Option<PgPool>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn Store>,
        storage: Arc<dyn ObjectStorage>,
        lookup: VehicleLookup,
    ) -> Self {
        let media = MediaService::new(store.clone(), storage);

        Self {
            accounts: AccountService::new(
                store.clone(),
                config.security.jwt_secret.clone(),
                config.security.jwt_expiry_seconds,
            ),
            profiles: ProfileService::new(store.clone(), media.clone()),
            followers: FollowerService::new(store.clone()),
            garage: GarageService::new(store.clone(), media.clone(), config.garage.empty_patch),
            logbook: LogbookService::new(store, media),
            lookup,
            config: Arc::new(config),
            pool: None,
        }
    }

    /// Attach the pool used by `/health`.
    pub fn with_pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }
}

pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .merge(handlers::protected::profile_routes())
        .merge(handlers::protected::follower_routes())
        .merge(handlers::protected::garage_routes())
        .merge(handlers::protected::logbook_routes())
        .merge(handlers::protected::vehicle_routes())
        .route_layer(from_fn_with_state(state.clone(), middleware::require_auth));

    let api = Router::new()
        .merge(handlers::public::auth_routes())
        .merge(protected);

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", api)
        // Global middleware, outermost first
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config))
                .layer(DefaultBodyLimit::max(state.config.server.max_upload_bytes)),
        )
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let expose = [HeaderName::from_static(TOKEN_HEADER)];

    if crate::is_development!(config) || config.security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive().expose_headers(expose);
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers(expose)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Logbook API",
            "version": version,
            "description": "Vehicle garage and maintenance logbook backend",
            "endpoints": {
                "auth": "/api/v1/register, /api/v1/login (public)",
                "profile": "/api/v1/self[/avatar], /api/v1/user/:id (protected)",
                "follow": "/api/v1/follow, /api/v1/unfollow (protected)",
                "garage": "/api/v1/garage, /api/v1/garage/vehicle[/:registration[/exists|/uploadImage]] (protected)",
                "logbook": "/api/v1/log[/:id[/media]] (protected)",
                "lookup": "/api/v1/vehicle/lookup/:registration (protected)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    let Some(pool) = &state.pool else {
        return (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "not configured" }
            })),
        );
    };

    match DatabaseManager::health_check(pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": true,
                    "message": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE"
                })),
            )
        }
    }
}
