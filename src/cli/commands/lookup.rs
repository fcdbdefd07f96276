use std::sync::Arc;

use crate::cli::{utils::output_record, OutputFormat};
use crate::config::AppConfig;
use crate::services::enrichment::{DvlaClient, DvsaClient};
use crate::services::VehicleLookup;

/// DVLA facts + DVSA MOT history over HTTP, as configured.
pub fn registry_lookup(config: &AppConfig) -> anyhow::Result<VehicleLookup> {
    let timeout = config.enrichment_timeout();
    let facts = DvlaClient::new(&config.enrichment, timeout)?;
    let mot = DvsaClient::new(&config.enrichment, timeout)?;
    Ok(VehicleLookup::new(Arc::new(facts), Arc::new(mot)))
}

pub async fn handle(config: AppConfig, registration: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let lookup = registry_lookup(&config)?;
    let record = lookup.lookup(registration).await?;
    output_record(&output_format, &serde_json::to_value(record)?)
}
