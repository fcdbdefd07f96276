#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use logbook_api::config::AppConfig;
use logbook_api::services::enrichment::{MotHistory, MotTest, VehicleFacts};
use logbook_api::services::VehicleLookup;
use logbook_api::testing::{MemoryObjectStorage, MemoryStore, StaticVehicleSource};
use logbook_api::{app, AppState, TOKEN_HEADER};
use reqwest::StatusCode;
use serde_json::{json, Value};

/// One in-process API on a free port, backed by the in-memory fakes.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    pub store: Arc<MemoryStore>,
    pub storage: Arc<MemoryObjectStorage>,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(AppConfig::development()).await
    }

    pub async fn spawn_with(config: AppConfig) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let store = Arc::new(MemoryStore::new());
        let storage = Arc::new(MemoryObjectStorage::new());
        let source = Arc::new(registry_fixture());
        let lookup = VehicleLookup::new(source.clone(), source);

        let state = AppState::new(config, store.clone(), storage.clone(), lookup);
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;

        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self {
            port,
            base_url,
            client: reqwest::Client::new(),
            store,
            storage,
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/register"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?)
    }

    /// Register, log in and return the bearer token.
    pub async fn token_for(&self, email: &str) -> Result<String> {
        let res = self.register(email, "password123").await?;
        assert_eq!(res.status(), StatusCode::CREATED, "register {}", email);

        let res = self.login(email, "password123").await?;
        assert_eq!(res.status(), StatusCode::OK, "login {}", email);

        let token = res
            .headers()
            .get(TOKEN_HEADER)
            .context("login response carries no token header")?
            .to_str()?
            .to_string();
        Ok(token)
    }

    pub fn get(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn post(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token)
    }

    pub fn put(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token)
    }

    pub fn patch(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.patch(self.url(path)).bearer_auth(token)
    }

    /// Add a vehicle and return its id.
    pub async fn add_vehicle(&self, token: &str, registration: &str) -> Result<String> {
        let res = self
            .post("/garage/vehicle", token)
            .json(&json!({
                "registration": registration,
                "make": "FORD",
                "model": "FIESTA",
                "year": 2012,
                "engine_size": 1242,
                "color": "BLUE",
                "mileage": 81000,
                "nickname": "Blue"
            }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED, "add vehicle {}", registration);

        let body: Value = res.json().await?;
        Ok(body["data"]["id"].as_str().context("vehicle id missing")?.to_string())
    }
}

/// A one-file multipart form under `field`.
pub fn file_form(field: &str, filename: &str, bytes: &[u8]) -> Result<reqwest::multipart::Form> {
    let part = reqwest::multipart::Part::bytes(bytes.to_vec())
        .file_name(filename.to_string())
        .mime_str("image/jpeg")?;
    Ok(reqwest::multipart::Form::new().part(field.to_string(), part))
}

/// Registry answers for AB12CDE; anything else is unknown.
pub fn registry_fixture() -> StaticVehicleSource {
    let facts = VehicleFacts {
        registration_number: "AB12CDE".to_string(),
        tax_status: "Taxed".to_string(),
        tax_due_date: "2025-03-01".to_string(),
        mot_status: "Valid".to_string(),
        mot_expiry_date: "2025-06-14".to_string(),
        make: "FORD".to_string(),
        year_of_manufacture: 2012,
        engine_capacity: 1242,
        colour: "BLUE".to_string(),
    };
    let history = MotHistory {
        registration: "AB12CDE".to_string(),
        make: "FORD".to_string(),
        model: "FIESTA".to_string(),
        first_used_date: "2012.06.15".to_string(),
        primary_colour: "Blue".to_string(),
        mot_test_expiry_date: String::new(),
        mot_tests: vec![MotTest {
            completed_date: "2024.06.10 09:12:44".to_string(),
            test_result: "PASSED".to_string(),
            expiry_date: "2025.06.14".to_string(),
        }],
    };

    StaticVehicleSource::new().with_vehicle("AB12CDE", facts, vec![history])
}
