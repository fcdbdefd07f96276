//! Object storage: put bytes under a key, get back the location URI.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use crate::config::StorageConfig;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage request timed out: {0}")]
    Timeout(String),

    #[error("Storage unreachable: {0}")]
    Transport(String),

    #[error("Storage rejected upload with status {status}")]
    Rejected { status: u16 },

    #[error("Invalid storage configuration: {0}")]
    Config(String),
}

/// Destination for uploaded media bytes.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `body` under `key` and return the public location of the object.
    async fn put(&self, key: &str, content_type: &str, body: Vec<u8>) -> Result<String, StorageError>;
}

/// Object store reached with plain HTTP `PUT {endpoint}/{bucket}/{key}`.
pub struct HttpObjectStorage {
    client: Client,
    base: Url,
    access_token: Option<String>,
}

impl HttpObjectStorage {
    pub fn new(config: &StorageConfig, timeout: Duration) -> Result<Self, StorageError> {
        let endpoint = config.endpoint.trim_end_matches('/');
        let base = Url::parse(&format!("{}/{}/", endpoint, config.bucket))
            .map_err(|e| StorageError::Config(format!("storage endpoint: {}", e)))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StorageError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base,
            access_token: config
                .access_token
                .as_ref()
                .filter(|t| !t.is_empty())
                .map(|t| t.expose().to_string()),
        })
    }

    fn object_url(&self, key: &str) -> Result<Url, StorageError> {
        self.base
            .join(key)
            .map_err(|e| StorageError::Config(format!("object key {}: {}", key, e)))
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn put(&self, key: &str, content_type: &str, body: Vec<u8>) -> Result<String, StorageError> {
        let url = self.object_url(key)?;
        let mut request = self
            .client
            .put(url.clone())
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, key, "Object store rejected upload");
            return Err(map_status_error(status));
        }

        Ok(url.to_string())
    }
}

fn map_transport_error(error: reqwest::Error) -> StorageError {
    if error.is_timeout() {
        StorageError::Timeout(error.to_string())
    } else {
        StorageError::Transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode) -> StorageError {
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            StorageError::Timeout(format!("status {}", status.as_u16()))
        }
        _ => StorageError::Rejected {
            status: status.as_u16(),
        },
    }
}

/// Reduce a client supplied filename to a single safe key segment.
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches('.');

    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}
