//! Site configuration. Every section falls back to defaults so partial files load.

use crate::geo::Coordinate;
use crate::risk::{AlertRules, FusionPolicy, GridParams, ThresholdPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding `weather.api_key`.
pub const WEATHER_API_KEY_ENV: &str = "GEOGUARD_WEATHER_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Monitored site
    pub site: SiteSection,
    /// Lattice parameters
    pub grid: GridConfig,
    /// Weather provider and cache
    pub weather: WeatherConfig,
    /// Sensor source selection
    pub sensors: SensorsConfig,
    /// Fusion weights and constants
    pub fusion: FusionPolicy,
    /// Band thresholds used for grid counts and the site-wide level
    pub classification: ThresholdPolicy,
    /// Alert rule thresholds
    pub alerts: AlertRules,
    /// Periodic recomputation
    pub daemon: DaemonConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    pub name: String,
    pub center: Coordinate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Cells per side (N of the N×N lattice)
    pub size: usize,
    /// Angular size of one cell (degrees)
    pub cell_size_deg: f64,
    /// Fixed seed for the geological perturbation; `None` draws fresh noise per call
    pub geology_seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherProviderKind {
    OpenWeatherMap,
    /// Always serve the synthetic fallback snapshot
    Simulated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub provider: WeatherProviderKind,
    /// Forecast endpoint (5-day / 3-hour)
    pub endpoint: String,
    pub api_key: Option<String>,
    /// Successful fetches are reused for this long
    pub cache_ttl_secs: u64,
    /// Request timeout; a timed-out fetch resolves to the fallback
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorSourceKind {
    Simulated,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorsConfig {
    pub source: SensorSourceKind,
    /// Live feed URL when `source` is `http`
    pub endpoint: Option<String>,
    /// Generator: number of sensors
    pub simulated_count: usize,
    /// Generator: full width of the uniform jitter box around the center (degrees)
    pub jitter_deg: f64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Recompute interval; 0 runs a single cycle
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            name: "site-a".to_string(),
            center: Coordinate::default(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: 20,
            cell_size_deg: 0.0005,
            geology_seed: None,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            provider: WeatherProviderKind::OpenWeatherMap,
            endpoint: "https://api.openweathermap.org/data/2.5/forecast".to_string(),
            api_key: None,
            cache_ttl_secs: 900,
            timeout_secs: 3,
        }
    }
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            source: SensorSourceKind::Simulated,
            endpoint: None,
            simulated_count: 5,
            jitter_deg: 0.01,
            timeout_secs: 5,
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self { interval_secs: 0 }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl SiteConfig {
    /// Load from JSON file if present; otherwise return default. The API key
    /// environment variable wins over the file.
    pub fn load(path: &Path) -> Self {
        let mut config = Self::read(path).unwrap_or_default();
        if let Ok(key) = std::env::var(WEATHER_API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.weather.api_key = Some(key);
            }
        }
        config
    }

    fn read(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        let data = std::fs::read_to_string(path).ok()?;
        serde_json::from_str::<SiteConfig>(&data).ok()
    }

    /// Lattice parameters for the fusion engine.
    pub fn grid_params(&self) -> GridParams {
        GridParams {
            size: self.grid.size,
            cell_size_deg: self.grid.cell_size_deg,
            center: self.site.center,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_site() {
        let c = SiteConfig::default();
        assert_eq!(c.grid.size, 20);
        assert_eq!(c.weather.cache_ttl_secs, 900);
        assert_eq!(c.site.center, Coordinate::new(11.1053, 79.1506));
        assert_eq!(c.classification.name, "standard");
        assert_eq!(c.daemon.interval_secs, 0);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let c: SiteConfig =
            serde_json::from_str(r#"{"grid": {"size": 12}, "log": {"json": false}}"#).unwrap();
        assert_eq!(c.grid.size, 12);
        assert_eq!(c.grid.cell_size_deg, 0.0005);
        assert!(!c.log.json);
        assert_eq!(c.log.level, "info");
        assert_eq!(c.fusion, FusionPolicy::default());
    }

    #[test]
    fn grid_params_follow_site_center() {
        let mut c = SiteConfig::default();
        c.site.center = Coordinate::new(1.0, 2.0);
        c.grid.size = 7;
        let p = c.grid_params();
        assert_eq!(p.size, 7);
        assert_eq!(p.center, Coordinate::new(1.0, 2.0));
    }
}
