//! NASA POWER daily point client
//!
//! Queries `{base_url}/temporal/daily/point` for a fixed date range and
//! averages each parameter over the days that carry a value.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::AtmosphericSource;
use crate::AeroSenseError;
use crate::config::{ParameterNames, RemoteConfig};
use crate::models::{EnvironmentalSample, Location, Provenance, Readings};

/// POWER marks missing days with this value
const FILL_VALUE: f64 = -999.0;
const KPA_TO_HPA: f64 = 10.0;
const MS_TO_KMH: f64 = 3.6;

/// Response structure of the POWER point endpoint (only the parts we read)
#[derive(Debug, Deserialize)]
pub struct PowerResponse {
    pub properties: PowerProperties,
}

#[derive(Debug, Deserialize)]
pub struct PowerProperties {
    /// Parameter name -> date (YYYYMMDD) -> value
    pub parameter: HashMap<String, BTreeMap<String, f64>>,
}

pub struct PowerClient {
    client: Client,
    base_url: String,
    community: String,
    start_date: String,
    end_date: String,
    parameters: ParameterNames,
}

impl PowerClient {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("aerosense/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            community: config.community.clone(),
            start_date: config.start_date.clone(),
            end_date: config.end_date.clone(),
            parameters: config.parameters.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/temporal/daily/point", self.base_url)
    }

    fn parameter_list(&self) -> String {
        let p = &self.parameters;
        [
            &p.temperature,
            &p.humidity,
            &p.pollen_index,
            &p.pm25,
            &p.uv_index,
            &p.wind_speed,
            &p.air_pressure,
        ]
        .map(String::as_str)
        .join(",")
    }
}

#[async_trait]
impl AtmosphericSource for PowerClient {
    fn name(&self) -> &str {
        "nasa-power"
    }

    #[instrument(skip(self, location), fields(lat = location.latitude, lon = location.longitude))]
    async fn fetch(&self, location: &Location) -> Result<EnvironmentalSample> {
        let start_time = Instant::now();
        debug!("Requesting {} from {}", self.parameter_list(), self.endpoint());

        let response = self
            .client
            .get(self.endpoint())
            .query(&[
                ("parameters", self.parameter_list()),
                ("community", self.community.clone()),
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("start", self.start_date.clone()),
                ("end", self.end_date.clone()),
                ("format", "JSON".to_string()),
            ])
            .send()
            .await
            .with_context(|| "Failed to reach atmospheric data service")?;

        let status = response.status();
        if !status.is_success() {
            return Err(AeroSenseError::api(format!(
                "atmospheric data service answered {status}"
            ))
            .into());
        }

        let payload: PowerResponse = response
            .json()
            .await
            .with_context(|| "Failed to parse POWER response")?;

        let sample = sample_from_payload(&payload, &self.parameters, location)?;

        let elapsed = start_time.elapsed();
        info!("Retrieved atmospheric data in {:.3}s", elapsed.as_secs_f64());
        if elapsed.as_secs() > 5 {
            warn!("Slow atmospheric data response: {:.3}s", elapsed.as_secs_f64());
        }
        Ok(sample)
    }
}

/// Mean of the non-fill values of one parameter
fn mean_of(payload: &PowerResponse, name: &str) -> Result<f64, AeroSenseError> {
    let series = payload
        .properties
        .parameter
        .get(name)
        .ok_or_else(|| AeroSenseError::api(format!("parameter {name} missing from response")))?;

    let values: Vec<f64> = series
        .values()
        .copied()
        .filter(|v| v.is_finite() && *v > FILL_VALUE)
        .collect();

    if values.is_empty() {
        return Err(AeroSenseError::api(format!("parameter {name} has no valid days")));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Build a sample from a POWER payload. Every field must be present and in
/// range; otherwise the whole payload is rejected.
pub fn sample_from_payload(
    payload: &PowerResponse,
    names: &ParameterNames,
    location: &Location,
) -> Result<EnvironmentalSample, AeroSenseError> {
    let uv = mean_of(payload, &names.uv_index)?.round();
    if !(0.0..=f64::from(u8::MAX)).contains(&uv) {
        return Err(AeroSenseError::validation(format!("uv_index {uv} is not a valid index")));
    }

    let readings = Readings {
        temperature: mean_of(payload, &names.temperature)?,
        humidity: mean_of(payload, &names.humidity)?,
        pollen_index: mean_of(payload, &names.pollen_index)?,
        pm25: mean_of(payload, &names.pm25)?,
        uv_index: uv as u8,
        wind_speed: mean_of(payload, &names.wind_speed)? * MS_TO_KMH,
        air_pressure: mean_of(payload, &names.air_pressure)? * KPA_TO_HPA,
        co2: None,
        no2: None,
        ozone: None,
    };

    EnvironmentalSample::new(readings, Provenance::Real, location.clone())
}
