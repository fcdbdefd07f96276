//! Vehicle registry enrichment.
//!
//! Two upstream sources are queried concurrently for a registration: the
//! licensing record (make, tax, MOT expiry) and the MOT test history (model,
//! colour, first use). [`reconcile`] folds both into one [`VehicleRecord`].

mod dvla;
mod dvsa;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, Months, NaiveDate};
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::database::models::{normalize_registration, NewVehicle};

pub use dvla::DvlaClient;
pub use dvsa::DvsaClient;

#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    #[error("invalid registration number")]
    InvalidRegistration,

    #[error("Vehicle registry timed out: {0}")]
    Timeout(String),

    #[error("Vehicle registry unavailable: {0}")]
    Unavailable(String),

    #[error("Unexpected vehicle registry payload: {0}")]
    Decode(String),

    #[error("Invalid enrichment configuration: {0}")]
    Config(String),
}

/// Licensing record for one vehicle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VehicleFacts {
    pub registration_number: String,
    pub tax_status: String,
    pub tax_due_date: String,
    pub mot_status: String,
    pub mot_expiry_date: String,
    pub make: String,
    pub year_of_manufacture: i32,
    pub engine_capacity: i32,
    pub colour: String,
}

/// MOT history entry for one vehicle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MotHistory {
    pub registration: String,
    pub make: String,
    pub model: String,
    pub first_used_date: String,
    pub primary_colour: String,
    #[serde(alias = "MotTestExpiryDate")]
    pub mot_test_expiry_date: String,
    pub mot_tests: Vec<MotTest>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MotTest {
    pub completed_date: String,
    pub test_result: String,
    pub expiry_date: String,
}

/// Reconciled registry answer, shaped like an add-vehicle payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub registration: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub engine_size: i32,
    pub color: String,
    pub registered: String,
    pub tax_date: String,
    pub mot_date: String,
}

impl From<VehicleRecord> for NewVehicle {
    fn from(record: VehicleRecord) -> Self {
        NewVehicle {
            registration: record.registration,
            make: record.make,
            model: record.model,
            year: record.year,
            engine_size: record.engine_size,
            color: record.color,
            registered: record.registered,
            tax_date: record.tax_date,
            mot_date: record.mot_date,
            ..NewVehicle::default()
        }
    }
}

#[async_trait]
pub trait VehicleFactsSource: Send + Sync {
    async fn vehicle_facts(&self, registration: &str) -> Result<VehicleFacts, EnrichmentError>;
}

#[async_trait]
pub trait MotHistorySource: Send + Sync {
    async fn mot_history(&self, registration: &str) -> Result<Vec<MotHistory>, EnrichmentError>;
}

/// Registration in, reconciled vehicle facts out.
#[derive(Clone)]
pub struct VehicleLookup {
    facts: Arc<dyn VehicleFactsSource>,
    mot: Arc<dyn MotHistorySource>,
}

impl VehicleLookup {
    pub fn new(facts: Arc<dyn VehicleFactsSource>, mot: Arc<dyn MotHistorySource>) -> Self {
        Self { facts, mot }
    }

    pub async fn lookup(&self, registration: &str) -> Result<VehicleRecord, EnrichmentError> {
        let registration = normalize_registration(registration);
        if registration.is_empty() {
            return Err(EnrichmentError::InvalidRegistration);
        }

        let (facts, history) = futures::try_join!(
            self.facts.vehicle_facts(&registration),
            self.mot.mot_history(&registration),
        )?;

        let record = reconcile(&registration, &facts, &history)?;
        tracing::debug!(registration = %record.registration, "Vehicle registry lookup reconciled");
        Ok(record)
    }
}

const MOT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Merge the two registry answers into one record.
///
/// An empty MOT history means the registration is unknown to the MOT
/// service and is reported as an invalid registration.
pub fn reconcile(
    registration: &str,
    facts: &VehicleFacts,
    history: &[MotHistory],
) -> Result<VehicleRecord, EnrichmentError> {
    let mot = history.first().ok_or(EnrichmentError::InvalidRegistration)?;

    let tax_date = first_present(&facts.tax_due_date, &facts.tax_status);

    let mot_date = if facts.mot_expiry_date.is_empty() {
        latest_test_expiry(mot)
            .unwrap_or(&mot.mot_test_expiry_date)
            .replace('.', "-")
    } else {
        facts.mot_expiry_date.clone()
    };

    let registered = if !mot.first_used_date.is_empty() {
        mot.first_used_date.replace('.', "-")
    } else if !mot_date.is_empty() {
        registered_from_mot_due(&mot_date)?
    } else {
        String::new()
    };

    Ok(VehicleRecord {
        registration: registration.to_string(),
        make: first_present(&facts.make, &mot.make),
        model: mot.model.clone(),
        year: facts.year_of_manufacture,
        engine_size: facts.engine_capacity,
        color: first_present(&mot.primary_colour, &facts.colour),
        registered,
        tax_date,
        mot_date,
    })
}

fn first_present(preferred: &str, fallback: &str) -> String {
    if preferred.is_empty() {
        fallback.to_string()
    } else {
        preferred.to_string()
    }
}

/// Expiry of the most recently completed test that carries one.
fn latest_test_expiry(history: &MotHistory) -> Option<&str> {
    history
        .mot_tests
        .iter()
        .filter(|t| !t.expiry_date.is_empty())
        .max_by(|a, b| a.completed_date.cmp(&b.completed_date))
        .map(|t| t.expiry_date.as_str())
}

/// A first MOT falls due three years after registration.
fn registered_from_mot_due(mot_due: &str) -> Result<String, EnrichmentError> {
    let due = NaiveDate::parse_from_str(&mot_due.replace('.', "-"), MOT_DATE_FORMAT)
        .map_err(|e| EnrichmentError::Decode(format!("MOT due date {:?}: {}", mot_due, e)))?;

    due.checked_sub_months(Months::new(36))
        .and_then(|d| d.checked_sub_days(Days::new(1)))
        .map(|d| d.format(MOT_DATE_FORMAT).to_string())
        .ok_or_else(|| EnrichmentError::Decode(format!("MOT due date {:?} out of range", mot_due)))
}

fn map_transport_error(source: &str, error: reqwest::Error) -> EnrichmentError {
    if error.is_timeout() {
        EnrichmentError::Timeout(format!("{}: {}", source, error))
    } else {
        EnrichmentError::Unavailable(format!("{}: {}", source, error))
    }
}

fn map_status_error(source: &str, status: StatusCode) -> EnrichmentError {
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            EnrichmentError::Timeout(format!("{} status {}", source, status.as_u16()))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            EnrichmentError::Unavailable(format!("{} rate limited", source))
        }
        _ if status.is_client_error() => EnrichmentError::InvalidRegistration,
        _ => EnrichmentError::Unavailable(format!("{} status {}", source, status.as_u16())),
    }
}

async fn decode_response<T: DeserializeOwned>(
    source: &str,
    response: reqwest::Response,
) -> Result<T, EnrichmentError> {
    let status = response.status();
    if !status.is_success() {
        return Err(map_status_error(source, status));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| map_transport_error(source, e))?;
    serde_json::from_slice(&body)
        .map_err(|e| EnrichmentError::Decode(format!("{} payload: {}", source, e)))
}
