//! Risk fusion engine, classification policies and alert rules.

mod alerts;
mod classify;
mod engine;
mod grid;
mod policy;

pub use alerts::{
    derive_alerts, AlertRules, CRITICAL_RISK_ALERT, DISPLACEMENT_ALERT, HEAVY_RAINFALL_ALERT,
};
pub use classify::{RiskLevel, ThresholdPolicy};
pub use engine::RiskFusionEngine;
pub use grid::{BandCounts, GridParams, GridStats, RiskCell, RiskGrid};
pub use policy::{
    CombineWeights, FusionPolicy, GeologyPolicy, ProximityPolicy, SensorRiskPolicy,
    WeatherImpactPolicy, FUSION_POLICY_VERSION, MAX_RISK_SCORE,
};
