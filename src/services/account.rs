use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{ServiceError, ServiceResult};
use crate::auth::{hash_password, issue_token, validate_token, verify_password};
use crate::config::Secret;
use crate::database::models::{NewUser, User};
use crate::database::store::UserStore;
use crate::database::{Store, StoreError};

const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Registration input. The email is checked after it is lower-cased.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 3, max = 100))]
    pub password: String,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user_id: Uuid,
    pub token: String,
}

/// Registration, login and bearer token resolution.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
    jwt_secret: Secret,
    token_ttl_seconds: i64,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, jwt_secret: Secret, token_ttl_seconds: i64) -> Self {
        Self {
            store,
            jwt_secret,
            token_ttl_seconds,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<User> {
        let request = RegisterRequest {
            email: normalize_email(&request.email),
            ..request
        };
        request.validate()?;

        let RegisterRequest { email, password } = request;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

        let user = self
            .store
            .create_user(NewUser {
                email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => ServiceError::conflict("email already registered"),
                other => other.into(),
            })?;

        tracing::info!(user_id = %user.id, "Registered user");
        Ok(user)
    }

    /// Wrong email and wrong password answer identically.
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<LoginOutcome> {
        let email = normalize_email(email);
        let user = self
            .store
            .get_user_by_email(&email)
            .await?
            .ok_or_else(|| ServiceError::bad_request(INVALID_CREDENTIALS))?;

        let hash = user.password_hash.clone();
        let candidate = password.to_string();
        let verified = tokio::task::spawn_blocking(move || verify_password(&hash, &candidate)).await?;
        if !verified {
            tracing::debug!(user_id = %user.id, "Login rejected");
            return Err(ServiceError::bad_request(INVALID_CREDENTIALS));
        }

        let token = issue_token(user.id, self.jwt_secret.expose().as_bytes(), self.token_ttl_seconds)?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginOutcome {
            user_id: user.id,
            token,
        })
    }

    /// Resolve a bearer token to a live user. Every failure is `Forbidden`.
    pub async fn authenticate(&self, token: &str) -> ServiceResult<User> {
        let user_id = validate_token(token, self.jwt_secret.expose().as_bytes()).map_err(|e| {
            tracing::debug!("Rejected token: {}", e);
            ServiceError::forbidden("permission denied")
        })?;

        self.store
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| {
                tracing::warn!(user_id = %user_id, "Token subject no longer exists");
                ServiceError::forbidden("permission denied")
            })
    }
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}
