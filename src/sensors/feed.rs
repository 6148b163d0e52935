//! Live telemetry feed: GET a JSON array of sensors from the configured endpoint.

use super::{SensorSample, SensorSource};
use crate::config::SensorsConfig;
use crate::error::SensorError;
use crate::geo::Coordinate;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Wire shape of one sensor. Accepts nested `location`/`values` blocks or flat
/// fields; any missing number reads as zero.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSensor {
    #[serde(alias = "sensor_id")]
    pub id: Option<String>,
    pub location: Option<RawLocation>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub values: Option<RawValues>,
    pub disp_mm: Option<f64>,
    pub pore_kpa: Option<f64>,
    pub vibration_g: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLocation {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawValues {
    pub disp_mm: Option<f64>,
    pub pore_kpa: Option<f64>,
    pub vibration_g: Option<f64>,
}

impl RawSensor {
    /// Normalize to a sample; `index` names sensors that arrive without an id.
    pub fn into_sample(self, index: usize) -> SensorSample {
        let loc = self.location.unwrap_or_default();
        let values = self.values.unwrap_or_default();
        SensorSample::new(
            self.id.unwrap_or_else(|| format!("S{}", index)),
            Coordinate::new(
                loc.lat.or(self.lat).unwrap_or(0.0),
                loc.lon.or(self.lon).unwrap_or(0.0),
            ),
            values.disp_mm.or(self.disp_mm).unwrap_or(0.0),
            values.pore_kpa.or(self.pore_kpa).unwrap_or(0.0),
            values.vibration_g.or(self.vibration_g).unwrap_or(0.0),
        )
        .sanitized()
    }
}

/// Parse a feed body into samples.
pub fn parse_sensor_array(body: &str) -> Result<Vec<SensorSample>, SensorError> {
    let raw: Vec<RawSensor> = serde_json::from_str(body)?;
    Ok(raw
        .into_iter()
        .enumerate()
        .map(|(i, r)| r.into_sample(i))
        .collect())
}

pub struct HttpSensorFeed {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpSensorFeed {
    /// Returns `None` when no endpoint is configured or the client cannot be built.
    pub fn new(config: &SensorsConfig) -> Option<Self> {
        let url = config.endpoint.as_ref()?.trim_end_matches('/').to_string();
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .ok()?;
        Some(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SensorSource for HttpSensorFeed {
    fn get_sensors(&self) -> Result<Vec<SensorSample>, SensorError> {
        let res = self.client.get(&self.url).send()?;
        let status = res.status();
        if !status.is_success() {
            return Err(SensorError::Status(status.as_u16()));
        }
        let body = res.text()?;
        let samples = parse_sensor_array(&body)?;
        debug!(count = samples.len(), url = %self.url, "sensor feed read");
        Ok(samples)
    }
}
