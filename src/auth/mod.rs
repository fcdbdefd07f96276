//! Credential primitives: password hashing and signed bearer tokens.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use password_hash::{PasswordHash, SaltString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by every bearer token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, ttl_seconds: i64) -> Result<Self, TokenError> {
        let now = Utc::now();
        let exp = Duration::try_seconds(ttl_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| TokenError::Generation(format!("expiry out of range: {}s", ttl_seconds)))?
            .timestamp();

        Ok(Self {
            sub: user_id.to_string(),
            exp,
            iat: now.timestamp(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("JWT generation error: {0}")]
    Generation(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Invalid or expired token")]
    Invalid,
}

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to generate salt: {0}")]
    Salt(String),

    #[error("Failed to hash password: {0}")]
    Hash(String),
}

/// Hash a password into a PHC string (argon2id, random 16 byte salt).
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| PasswordError::Salt(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| PasswordError::Salt(e.to_string()))?;

    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?
        .to_string();
    Ok(phc)
}

/// Check a candidate password against a stored PHC hash.
///
/// The digest comparison inside `argon2` is constant time. A hash that does
/// not parse never verifies.
pub fn verify_password(hash: &str, candidate: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Sign an HS256 token for `user_id` that expires `ttl_seconds` from now.
pub fn issue_token(user_id: Uuid, secret: &[u8], ttl_seconds: i64) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let claims = Claims::new(user_id, ttl_seconds)?;
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| TokenError::Generation(e.to_string()))
}

/// Validate a token and return its subject.
///
/// Any failure (bad structure, signature, algorithm, expiry, or a subject
/// that is not a user id) yields `TokenError::Invalid`.
pub fn validate_token(token: &str, secret: &[u8]) -> Result<Uuid, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
        .map_err(|e| {
            tracing::debug!("Token rejected: {}", e);
            TokenError::Invalid
        })?;

    Uuid::parse_str(&token_data.claims.sub).map_err(|_| TokenError::Invalid)
}
