//! Weather provider boundary and the OpenWeatherMap forecast client.

use super::{DataSource, WeatherCondition, WeatherSnapshot};
use crate::config::WeatherConfig;
use crate::error::WeatherError;
use crate::geo::Coordinate;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Forecast entries are 3 hours apart.
const HOURS_PER_ENTRY: usize = 3;

/// External weather source. Implementations may fail; `WeatherSource` absorbs the failure.
pub trait WeatherProvider: Send + Sync {
    /// Fetch current conditions and forecast rainfall for `site`, stamped `fetched_at`.
    fn fetch(&self, site: Coordinate, fetched_at: DateTime<Utc>) -> Result<WeatherSnapshot, WeatherError>;
}

/// 5-day / 3-hour forecast payload. Every field is optional; absent numbers read as zero.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ForecastResponse {
    pub cod: Option<serde_json::Value>,
    pub message: Option<serde_json::Value>,
    pub list: Vec<ForecastEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ForecastEntry {
    pub main: MainBlock,
    pub wind: WindBlock,
    pub weather: Vec<ConditionBlock>,
    pub rain: Option<RainBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MainBlock {
    pub temp: Option<f64>,
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WindBlock {
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConditionBlock {
    pub main: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RainBlock {
    #[serde(rename = "3h")]
    pub three_hour: Option<f64>,
}

impl ForecastEntry {
    fn rain_3h(&self) -> f64 {
        self.rain
            .as_ref()
            .and_then(|r| r.three_hour)
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
            .max(0.0)
    }
}

fn num(v: Option<f64>) -> f64 {
    v.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn cod_is_ok(cod: &serde_json::Value) -> bool {
    match cod {
        serde_json::Value::String(s) => s == "200",
        serde_json::Value::Number(n) => n.as_u64() == Some(200),
        _ => false,
    }
}

/// Reduce a forecast payload to a live snapshot.
///
/// Current conditions come from the first entry. Rainfall totals sum the 3-hour
/// volumes over the first 8 (24h) and 24 (72h) entries; intensity is the peak
/// 3-hour volume over the whole forecast expressed per hour.
pub fn parse_forecast(
    response: &ForecastResponse,
    fetched_at: DateTime<Utc>,
) -> Result<WeatherSnapshot, WeatherError> {
    if let Some(cod) = &response.cod {
        if !cod_is_ok(cod) {
            let message = response
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("cod {}", cod));
            return Err(WeatherError::Api(message));
        }
    }
    let current = response
        .list
        .first()
        .ok_or_else(|| WeatherError::Malformed("empty forecast list".to_string()))?;

    let sum_over = |hours: usize| -> f64 {
        response
            .list
            .iter()
            .take(hours / HOURS_PER_ENTRY)
            .map(ForecastEntry::rain_3h)
            .sum()
    };
    let max_intensity = response
        .list
        .iter()
        .map(|e| e.rain_3h() / HOURS_PER_ENTRY as f64)
        .fold(0.0_f64, f64::max);

    let condition = current
        .weather
        .first()
        .and_then(|w| w.main.as_deref())
        .map(WeatherCondition::from_label)
        .unwrap_or_default();

    Ok(WeatherSnapshot {
        temperature_c: num(current.main.temp),
        humidity_pct: num(current.main.humidity),
        wind_speed: num(current.wind.speed),
        condition,
        rainfall_24h_mm: round2(sum_over(24)),
        rainfall_72h_mm: round2(sum_over(72)),
        max_rain_intensity: round2(max_intensity),
        data_source: DataSource::Live,
        fetched_at,
    })
}

/// OpenWeatherMap forecast client (blocking, with connect and request timeouts).
pub struct OpenWeatherMapProvider {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

impl OpenWeatherMapProvider {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(WeatherError::NotConfigured("missing api key"))?
            .to_string();
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
        })
    }
}

impl WeatherProvider for OpenWeatherMapProvider {
    fn fetch(&self, site: Coordinate, fetched_at: DateTime<Utc>) -> Result<WeatherSnapshot, WeatherError> {
        let lat = site.lat.to_string();
        let lon = site.lon.to_string();
        let res = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()?;
        let status = res.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status.as_u16()));
        }
        let body: ForecastResponse = res
            .json()
            .map_err(|e| WeatherError::Malformed(e.to_string()))?;
        debug!(entries = body.list.len(), "forecast received");
        parse_forecast(&body, fetched_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(rain_3h: Option<f64>) -> serde_json::Value {
        let mut e = json!({
            "main": {"temp": 29.5, "humidity": 71},
            "wind": {"speed": 4.2},
            "weather": [{"main": "Rain"}]
        });
        if let Some(r) = rain_3h {
            e["rain"] = json!({"3h": r});
        }
        e
    }

    fn parse(v: serde_json::Value) -> Result<WeatherSnapshot, WeatherError> {
        let resp: ForecastResponse = serde_json::from_value(v).unwrap();
        parse_forecast(&resp, Utc::now())
    }

    #[test]
    fn sums_rain_over_24_and_72_hours() {
        // 30 entries, 1.5mm each; one 9mm burst at entry 10.
        let list: Vec<_> = (0..30)
            .map(|i| entry(Some(if i == 10 { 9.0 } else { 1.5 })))
            .collect();
        let s = parse(json!({"cod": "200", "list": list})).unwrap();
        assert_eq!(s.rainfall_24h_mm, 12.0);
        assert_eq!(s.rainfall_72h_mm, 23.0 * 1.5 + 9.0);
        assert_eq!(s.max_rain_intensity, 3.0);
        assert_eq!(s.temperature_c, 29.5);
        assert_eq!(s.humidity_pct, 71.0);
        assert_eq!(s.condition, WeatherCondition::Rain);
        assert_eq!(s.data_source, DataSource::Live);
    }

    #[test]
    fn missing_fields_read_as_zero() {
        let s = parse(json!({"cod": 200, "list": [{"weather": []}, {"main": {"temp": null}}]})).unwrap();
        assert_eq!(s.temperature_c, 0.0);
        assert_eq!(s.wind_speed, 0.0);
        assert_eq!(s.rainfall_24h_mm, 0.0);
        assert_eq!(s.condition, WeatherCondition::Clear);
    }

    #[test]
    fn api_error_code_is_rejected() {
        let err = parse(json!({"cod": "401", "message": "Invalid API key"})).unwrap_err();
        assert!(matches!(err, WeatherError::Api(_)));
    }

    #[test]
    fn empty_list_is_malformed() {
        let err = parse(json!({"cod": "200", "list": []})).unwrap_err();
        assert!(matches!(err, WeatherError::Malformed(_)));
    }

    #[test]
    fn provider_requires_api_key() {
        let config = WeatherConfig::default();
        assert!(matches!(
            OpenWeatherMapProvider::new(&config),
            Err(WeatherError::NotConfigured(_))
        ));
    }
}
