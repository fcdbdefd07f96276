//! MOT history client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::{decode_response, map_transport_error, EnrichmentError, MotHistory, MotHistorySource};
use crate::config::{EnrichmentConfig, Secret};

const SOURCE: &str = "dvsa";

pub struct DvsaClient {
    client: Client,
    endpoint: Url,
    api_key: Secret,
}

impl DvsaClient {
    pub fn new(config: &EnrichmentConfig, timeout: Duration) -> Result<Self, EnrichmentError> {
        let endpoint = Url::parse(&config.dvsa_url)
            .map_err(|e| EnrichmentError::Config(format!("DVSA_API_URL: {}", e)))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EnrichmentError::Config(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.dvsa_api_key.clone(),
        })
    }
}

#[async_trait]
impl MotHistorySource for DvsaClient {
    async fn mot_history(&self, registration: &str) -> Result<Vec<MotHistory>, EnrichmentError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("registration", registration)])
            .header("x-api-key", self.api_key.expose())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| map_transport_error(SOURCE, e))?;

        decode_response(SOURCE, response).await
    }
}
