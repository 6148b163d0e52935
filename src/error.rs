//! Error types. Only grid configuration errors reach callers of the pipeline;
//! weather and sensor failures are recovered where they happen.

use thiserror::Error;

/// Invalid lattice configuration. Fail fast: this is misconfiguration, not a transient fault.
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("lattice size must be positive, got {0}")]
    InvalidLatticeSize(usize),
    #[error("cell size must be a positive finite number of degrees, got {0}")]
    InvalidCellSize(f64),
    #[error("grid center must be a finite coordinate, got ({lat}, {lon})")]
    InvalidCenter { lat: f64, lon: f64 },
}

/// Weather provider failure. Never surfaced by `WeatherSource::get_weather`.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("weather provider returned status {0}")]
    Status(u16),
    #[error("weather provider error: {0}")]
    Api(String),
    #[error("malformed weather payload: {0}")]
    Malformed(String),
    #[error("weather provider not configured: {0}")]
    NotConfigured(&'static str),
}

/// Live sensor feed failure.
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("sensor feed request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("sensor feed returned status {0}")]
    Status(u16),
    #[error("malformed sensor payload: {0}")]
    Malformed(#[from] serde_json::Error),
}
