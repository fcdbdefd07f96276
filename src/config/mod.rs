use std::env;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
    pub enrichment: EnrichmentConfig,
    pub garage: GarageConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<Secret>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: Secret,
    pub jwt_expiry_seconds: i64,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Base URL of the object store; objects are PUT to `{endpoint}/{bucket}/{key}`.
    pub endpoint: String,
    pub bucket: String,
    pub access_token: Option<Secret>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    pub dvla_url: String,
    pub dvsa_url: String,
    pub dvla_api_key: Secret,
    pub dvsa_api_key: Secret,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct GarageConfig {
    pub empty_patch: EmptyPatchPolicy,
}

/// What a vehicle patch with no applicable fields does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyPatchPolicy {
    /// Answer with 400 Bad Request.
    Reject,
    /// Return the stored vehicle unchanged.
    Ignore,
}

impl EmptyPatchPolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reject" | "error" => Some(Self::Reject),
            "ignore" | "noop" | "no-op" => Some(Self::Ignore),
            _ => None,
        }
    }
}

/// String value that never shows up in `Debug` output or logs.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Minimum JWT secret length accepted outside development.
const MIN_SECRET_LEN: usize = 32;

/// Longest token lifetime accepted (one year).
const MAX_JWT_EXPIRY_SECONDS: i64 = 3600 * 24 * 365;

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(port) = env::var("LOGBOOK_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|v| v.parse().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("SERVER_MAX_UPLOAD_BYTES") {
            self.server.max_upload_bytes = v.parse().unwrap_or(self.server.max_upload_bytes);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(Secret::new(v));
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = Secret::new(v.trim());
        }
        if let Ok(v) = env::var("JWT_EXPIRATION_IN_SECONDS") {
            self.security.jwt_expiry_seconds = v.parse().unwrap_or(self.security.jwt_expiry_seconds);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Storage overrides
        if let Ok(v) = env::var("STORAGE_ENDPOINT") {
            self.storage.endpoint = v;
        }
        if let Ok(v) = env::var("STORAGE_BUCKET") {
            self.storage.bucket = v;
        }
        if let Ok(v) = env::var("STORAGE_ACCESS_TOKEN") {
            self.storage.access_token = Some(Secret::new(v.trim()));
        }
        if let Ok(v) = env::var("STORAGE_TIMEOUT_SECS") {
            self.storage.timeout_secs = v.parse().unwrap_or(self.storage.timeout_secs);
        }

        // Enrichment overrides
        if let Ok(v) = env::var("DVLA_API_URL") {
            self.enrichment.dvla_url = v;
        }
        if let Ok(v) = env::var("DVSA_API_URL") {
            self.enrichment.dvsa_url = v;
        }
        if let Ok(v) = env::var("DVLA_API_KEY") {
            self.enrichment.dvla_api_key = Secret::new(v.trim());
        }
        if let Ok(v) = env::var("DVSA_API_KEY") {
            self.enrichment.dvsa_api_key = Secret::new(v.trim());
        }
        if let Ok(v) = env::var("ENRICHMENT_TIMEOUT_SECS") {
            self.enrichment.timeout_secs = v.parse().unwrap_or(self.enrichment.timeout_secs);
        }

        // Garage overrides
        if let Ok(v) = env::var("GARAGE_EMPTY_PATCH") {
            match EmptyPatchPolicy::parse(&v) {
                Some(policy) => self.garage.empty_patch = policy,
                None => tracing::warn!("Ignoring unknown GARAGE_EMPTY_PATCH value '{}'", v),
            }
        }

        self
    }

    /// Check settings that would otherwise fail at request time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if self.environment != Environment::Development
            && self.security.jwt_secret.expose().len() < MIN_SECRET_LEN
        {
            return Err(ConfigError::Invalid {
                name: "JWT_SECRET",
                reason: format!("must be at least {} bytes", MIN_SECRET_LEN),
            });
        }
        if self.security.jwt_expiry_seconds <= 0 {
            return Err(ConfigError::Invalid {
                name: "JWT_EXPIRATION_IN_SECONDS",
                reason: "must be positive".to_string(),
            });
        }
        if self.security.jwt_expiry_seconds > MAX_JWT_EXPIRY_SECONDS {
            return Err(ConfigError::Invalid {
                name: "JWT_EXPIRATION_IN_SECONDS",
                reason: format!("must be at most {}", MAX_JWT_EXPIRY_SECONDS),
            });
        }
        url::Url::parse(&self.storage.endpoint).map_err(|e| ConfigError::Invalid {
            name: "STORAGE_ENDPOINT",
            reason: e.to_string(),
        })?;
        Ok(())
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_secs(self.storage.timeout_secs)
    }

    pub fn enrichment_timeout(&self) -> Duration {
        Duration::from_secs(self.enrichment.timeout_secs)
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 8080,
                max_upload_bytes: 20 * 1024 * 1024, // 20MB
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: Secret::new("development-only-secret"),
                jwt_expiry_seconds: 3600 * 24 * 7, // 1 week
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
            storage: StorageConfig {
                endpoint: "http://localhost:9000".to_string(),
                bucket: "logbook-app".to_string(),
                access_token: None,
                timeout_secs: 30,
            },
            enrichment: EnrichmentConfig {
                dvla_url: "https://driver-vehicle-licensing.api.gov.uk/vehicle-enquiry/v1/vehicles"
                    .to_string(),
                dvsa_url: "https://beta.check-mot.service.gov.uk/trade/vehicles/mot-tests".to_string(),
                dvla_api_key: Secret::default(),
                dvsa_api_key: Secret::default(),
                timeout_secs: 10,
            },
            garage: GarageConfig {
                empty_patch: EmptyPatchPolicy::Reject,
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.server.max_upload_bytes = 10 * 1024 * 1024; // 10MB
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.security.jwt_secret = Secret::default();
        config.security.jwt_expiry_seconds = 3600 * 24;
        config.security.cors_origins = vec!["https://staging.example.com".to_string()];
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.server.max_upload_bytes = 10 * 1024 * 1024; // 10MB
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.security.jwt_secret = Secret::default();
        config.security.jwt_expiry_seconds = 3600 * 24;
        config.security.cors_origins = vec!["https://app.example.com".to_string()];
        config.storage.timeout_secs = 15;
        config.enrichment.timeout_secs = 5;
        config
    }
}

#[macro_export]
macro_rules! is_development {
    ($config:expr) => {
        matches!($config.environment, $crate::config::Environment::Development)
    };
}
