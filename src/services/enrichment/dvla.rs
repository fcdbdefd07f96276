//! Licensing record client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::json;

use super::{decode_response, map_transport_error, EnrichmentError, VehicleFacts, VehicleFactsSource};
use crate::config::{EnrichmentConfig, Secret};

const SOURCE: &str = "dvla";

pub struct DvlaClient {
    client: Client,
    endpoint: Url,
    api_key: Secret,
}

impl DvlaClient {
    pub fn new(config: &EnrichmentConfig, timeout: Duration) -> Result<Self, EnrichmentError> {
        let endpoint = Url::parse(&config.dvla_url)
            .map_err(|e| EnrichmentError::Config(format!("DVLA_API_URL: {}", e)))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EnrichmentError::Config(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.dvla_api_key.clone(),
        })
    }
}

#[async_trait]
impl VehicleFactsSource for DvlaClient {
    async fn vehicle_facts(&self, registration: &str) -> Result<VehicleFacts, EnrichmentError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-api-key", self.api_key.expose())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&json!({ "registrationNumber": registration }))
            .send()
            .await
            .map_err(|e| map_transport_error(SOURCE, e))?;

        decode_response(SOURCE, response).await
    }
}
