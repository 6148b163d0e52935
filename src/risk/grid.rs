//! Lattice parameters, scored cells and the grid they form.

use super::classify::{RiskLevel, ThresholdPolicy};
use crate::error::GridError;
use crate::geo::Coordinate;
use crate::sensors::SensorStats;
use crate::weather::{DataSource, WeatherSnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// N×N lattice centered on the site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridParams {
    pub size: usize,
    pub cell_size_deg: f64,
    pub center: Coordinate,
}

impl GridParams {
    pub fn validate(&self) -> Result<(), GridError> {
        if self.size == 0 || self.size.checked_mul(self.size).is_none() {
            return Err(GridError::InvalidLatticeSize(self.size));
        }
        if !(self.cell_size_deg.is_finite() && self.cell_size_deg > 0.0) {
            return Err(GridError::InvalidCellSize(self.cell_size_deg));
        }
        if !self.center.is_finite() {
            return Err(GridError::InvalidCenter {
                lat: self.center.lat,
                lon: self.center.lon,
            });
        }
        Ok(())
    }

    pub fn half(&self) -> f64 {
        self.size as f64 / 2.0
    }

    /// Geographic center of cell (row, col).
    pub fn cell_location(&self, row: usize, col: usize) -> Coordinate {
        let half = self.half();
        self.center.offset(
            (row as f64 - half) * self.cell_size_deg,
            (col as f64 - half) * self.cell_size_deg,
        )
    }

    /// Grid distance of (row, col) from the lattice midpoint over the largest
    /// possible such distance. 1.0 at the (0, 0) corner.
    pub fn normalized_distance(&self, row: usize, col: usize) -> f64 {
        let half = self.half();
        let dist = (row as f64 - half).hypot(col as f64 - half);
        dist / (half * std::f64::consts::SQRT_2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskCell {
    pub id: String,
    pub row: usize,
    pub col: usize,
    pub location: Coordinate,
    /// Final score, clamped to `0..=ceiling`
    pub risk_score: f64,
    pub level: RiskLevel,
    pub mine_proximity_score: f64,
    pub geological_score: f64,
    pub sensor_influence_score: f64,
    pub weather_impact_score: f64,
}

impl RiskCell {
    pub fn cell_id(row: usize, col: usize) -> String {
        format!("C{}-{}", row, col)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

impl BandCounts {
    pub fn add(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Low => self.low += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::High => self.high += 1,
            RiskLevel::Critical => self.critical += 1,
        }
    }

    pub fn get(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::Low => self.low,
            RiskLevel::Medium => self.medium,
            RiskLevel::High => self.high,
            RiskLevel::Critical => self.critical,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridStats {
    pub average_risk: f64,
    pub max_risk: f64,
    pub min_risk: f64,
    pub total_cells: usize,
    pub band_counts: BandCounts,
}

impl GridStats {
    pub fn from_cells(cells: &[RiskCell]) -> Self {
        if cells.is_empty() {
            return Self::default();
        }
        let mut stats = Self {
            max_risk: f64::NEG_INFINITY,
            min_risk: f64::INFINITY,
            total_cells: cells.len(),
            ..Default::default()
        };
        let mut sum = 0.0;
        for c in cells {
            sum += c.risk_score;
            stats.max_risk = stats.max_risk.max(c.risk_score);
            stats.min_risk = stats.min_risk.min(c.risk_score);
            stats.band_counts.add(c.level);
        }
        stats.average_risk = sum / cells.len() as f64;
        stats
    }
}

/// One fusion result. Produced whole per call; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskGrid {
    pub id: Uuid,
    pub computed_at: DateTime<Utc>,
    pub policy_version: String,
    pub params: GridParams,
    pub classification: ThresholdPolicy,
    /// Row-major
    pub cells: Vec<RiskCell>,
    pub stats: GridStats,
    pub weather: WeatherSnapshot,
    pub weather_impact: f64,
    pub weather_multiplier: f64,
    pub sensor_stats: SensorStats,
}

impl RiskGrid {
    pub fn cell(&self, row: usize, col: usize) -> Option<&RiskCell> {
        if row >= self.params.size || col >= self.params.size {
            return None;
        }
        self.cells.get(row * self.params.size + col)
    }

    /// Live or simulated weather, passed through unchanged from the input snapshot.
    pub fn data_source(&self) -> DataSource {
        self.weather.data_source
    }

    /// Site-wide level: the worst cell under the grid's threshold policy.
    pub fn site_level(&self) -> RiskLevel {
        self.classification.classify(self.stats.max_risk)
    }
}
