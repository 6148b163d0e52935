//! GeoGuard: mine-site landslide risk fusion.
//!
//! Modular structure:
//! - [`weather`] — Cached site weather with a simulated fallback
//! - [`sensors`] — Point sensor samples from a generator or live feed
//! - [`risk`] — Fusion engine, threshold policies, alert rules
//! - [`pipeline`] — Weather + sensors → grid → site assessment
//! - [`logging`] — Structured JSON logging

pub mod config;
pub mod error;
pub mod geo;
pub mod weather;
pub mod sensors;
pub mod risk;
pub mod pipeline;
pub mod logging;

pub use config::SiteConfig;
pub use error::{GridError, SensorError, WeatherError};
pub use geo::Coordinate;
pub use weather::{DataSource, WeatherSnapshot, WeatherSource};
pub use sensors::{SensorSample, SensorSource};
pub use risk::{derive_alerts, RiskFusionEngine, RiskGrid, RiskLevel, ThresholdPolicy};
pub use pipeline::{RiskPipeline, SiteAssessment};
pub use logging::StructuredLogger;
