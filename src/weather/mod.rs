//! Weather input: snapshot types, provider boundary, TTL cache and the
//! never-failing `WeatherSource` that the fusion pipeline reads from.

mod cache;
mod provider;
mod source;

pub use cache::WeatherCache;
pub use provider::{parse_forecast, ForecastResponse, OpenWeatherMapProvider, WeatherProvider};
pub use source::{simulated_snapshot, WeatherSource};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dominant weather condition as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    #[default]
    Clear,
    Clouds,
    Drizzle,
    Rain,
    Thunderstorm,
    /// Anything the provider reports that is not one of the above (mist, haze, ...)
    Other,
}

impl WeatherCondition {
    /// Map a provider condition label (`weather[0].main`) to a condition.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "clear" => Self::Clear,
            "clouds" => Self::Clouds,
            "drizzle" => Self::Drizzle,
            "rain" => Self::Rain,
            "thunderstorm" => Self::Thunderstorm,
            _ => Self::Other,
        }
    }

    /// Saturation contribution of the condition, 0..=1.
    pub fn score(self) -> f64 {
        match self {
            Self::Thunderstorm => 1.0,
            Self::Rain => 0.6,
            Self::Drizzle => 0.3,
            Self::Clouds => 0.1,
            Self::Clear | Self::Other => 0.0,
        }
    }
}

/// Where a snapshot came from. Consumers use this to flag degraded confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Live,
    #[default]
    Simulated,
}

/// Weather at the site at `fetched_at`. Replaced, never mutated, when the cache expires.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSnapshot {
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub wind_speed: f64,
    pub condition: WeatherCondition,
    pub rainfall_24h_mm: f64,
    pub rainfall_72h_mm: f64,
    /// mm/hr
    pub max_rain_intensity: f64,
    pub data_source: DataSource,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    /// Copy with every non-finite numeric field replaced by zero.
    pub fn sanitized(&self) -> Self {
        Self {
            temperature_c: finite_or_zero(self.temperature_c),
            humidity_pct: finite_or_zero(self.humidity_pct),
            wind_speed: finite_or_zero(self.wind_speed),
            rainfall_24h_mm: finite_or_zero(self.rainfall_24h_mm),
            rainfall_72h_mm: finite_or_zero(self.rainfall_72h_mm),
            max_rain_intensity: finite_or_zero(self.max_rain_intensity),
            ..self.clone()
        }
    }
}

pub(crate) fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Wall-clock source. Injected so cache expiry can be tested without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
