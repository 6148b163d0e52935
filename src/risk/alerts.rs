//! Stateless alert rules over a computed grid.

use super::grid::RiskGrid;
use serde::{Deserialize, Serialize};

pub const CRITICAL_RISK_ALERT: &str = "CRITICAL: high landslide risk detected";
pub const HEAVY_RAINFALL_ALERT: &str = "WARNING: heavy rainfall increasing saturation";
pub const DISPLACEMENT_ALERT: &str = "ALERT: significant ground displacement detected";

/// Rule thresholds. Each rule fires when its value strictly exceeds the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertRules {
    pub max_risk: f64,
    pub rainfall_24h_mm: f64,
    pub displacement_mm: f64,
}

impl Default for AlertRules {
    fn default() -> Self {
        Self {
            max_risk: 0.75,
            rainfall_24h_mm: 20.0,
            displacement_mm: 3.0,
        }
    }
}

impl AlertRules {
    /// All matching rules, in declaration order.
    pub fn derive(&self, grid: &RiskGrid) -> Vec<String> {
        let rules: [(bool, &str); 3] = [
            (grid.stats.max_risk > self.max_risk, CRITICAL_RISK_ALERT),
            (grid.weather.rainfall_24h_mm > self.rainfall_24h_mm, HEAVY_RAINFALL_ALERT),
            (grid.sensor_stats.max_displacement_mm > self.displacement_mm, DISPLACEMENT_ALERT),
        ];
        rules
            .into_iter()
            .filter(|(fired, _)| *fired)
            .map(|(_, msg)| msg.to_string())
            .collect()
    }
}

/// Alerts under the default rule thresholds.
pub fn derive_alerts(grid: &RiskGrid) -> Vec<String> {
    AlertRules::default().derive(grid)
}
