//! Risk fusion: weather impact, proximity and geological priors, and
//! IDW-interpolated sensor risk combined into one score per lattice cell.

use super::classify::ThresholdPolicy;
use super::grid::{GridParams, GridStats, RiskCell, RiskGrid};
use super::policy::FusionPolicy;
use crate::error::GridError;
use crate::sensors::{SensorSample, SensorStats};
use crate::weather::WeatherSnapshot;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::{debug, warn};
use uuid::Uuid;

pub struct RiskFusionEngine {
    policy: FusionPolicy,
    thresholds: ThresholdPolicy,
}

/// Everything a cell score depends on, fixed before any cell is scored.
struct CellInputs<'a> {
    params: &'a GridParams,
    sensors: &'a [SensorSample],
    local_risks: Vec<f64>,
    noise: Vec<f64>,
    weather_impact: f64,
    weather_multiplier: f64,
}

impl RiskFusionEngine {
    pub fn new(policy: FusionPolicy, thresholds: ThresholdPolicy) -> Self {
        Self { policy, thresholds }
    }

    pub fn policy(&self) -> &FusionPolicy {
        &self.policy
    }

    pub fn thresholds(&self) -> &ThresholdPolicy {
        &self.thresholds
    }

    /// Compute a grid with fresh geological noise.
    pub fn compute_grid(
        &self,
        weather: &WeatherSnapshot,
        sensors: &[SensorSample],
        params: &GridParams,
    ) -> Result<RiskGrid, GridError> {
        self.compute_grid_with_rng(weather, sensors, params, &mut rand::thread_rng())
    }

    /// Compute a grid whose geological noise is fixed by `seed`.
    pub fn compute_grid_seeded(
        &self,
        weather: &WeatherSnapshot,
        sensors: &[SensorSample],
        params: &GridParams,
        seed: u64,
    ) -> Result<RiskGrid, GridError> {
        self.compute_grid_with_rng(weather, sensors, params, &mut StdRng::seed_from_u64(seed))
    }

    /// Compute a grid drawing geological noise from `rng`.
    ///
    /// Noise is drawn for every cell in row-major order before any cell is
    /// scored, so the result depends only on the inputs and the rng state.
    pub fn compute_grid_with_rng<R: Rng + ?Sized>(
        &self,
        weather: &WeatherSnapshot,
        sensors: &[SensorSample],
        params: &GridParams,
        rng: &mut R,
    ) -> Result<RiskGrid, GridError> {
        params.validate()?;
        let n = params.size;
        let weather = weather.sanitized();
        let sensors: Vec<SensorSample> = sensors
            .iter()
            .filter(|s| {
                let located = s.location.is_finite();
                if !located {
                    warn!(sensor_id = %s.sensor_id, "sensor has no finite location; excluded from fusion");
                }
                located
            })
            .map(SensorSample::sanitized)
            .collect();

        let weather_impact = self.policy.weather.impact(&weather);
        let inputs = CellInputs {
            params,
            local_risks: sensors
                .iter()
                .map(|s| self.policy.sensor.local_risk(s))
                .collect(),
            sensors: &sensors,
            noise: self.geological_noise(n * n, rng),
            weather_impact,
            weather_multiplier: self.policy.weather.multiplier(weather_impact),
        };
        let weather_multiplier = inputs.weather_multiplier;
        let cells = self.score_cells(&inputs);

        let stats = GridStats::from_cells(&cells);
        debug!(
            size = n,
            sensors = sensors.len(),
            weather_impact,
            weather_multiplier,
            max_risk = stats.max_risk,
            average_risk = stats.average_risk,
            "risk grid computed"
        );

        Ok(RiskGrid {
            id: Uuid::new_v4(),
            computed_at: Utc::now(),
            policy_version: self.policy.version.clone(),
            params: *params,
            classification: self.thresholds.clone(),
            cells,
            stats,
            sensor_stats: SensorStats::from_samples(&sensors),
            weather,
            weather_impact,
            weather_multiplier,
        })
    }

    fn score_cells(&self, inputs: &CellInputs<'_>) -> Vec<RiskCell> {
        let count = inputs.params.size * inputs.params.size;
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            (0..count)
                .into_par_iter()
                .map(|idx| self.score_cell(inputs, idx))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            (0..count).map(|idx| self.score_cell(inputs, idx)).collect()
        }
    }

    /// Score the cell at row-major index `idx`. Depends only on `inputs`.
    fn score_cell(&self, inputs: &CellInputs<'_>, idx: usize) -> RiskCell {
        let params = inputs.params;
        let n = params.size;
        let (row, col) = (idx / n, idx % n);
        let location = params.cell_location(row, col);

        let mine_proximity_score = self
            .policy
            .proximity
            .score(params.normalized_distance(row, col));
        let geology = &self.policy.geology;
        let geological_score = geology.finalize(geology.prior(row, col, n), inputs.noise[idx]);

        let sensor_influence_score = if inputs.sensors.is_empty() {
            0.0
        } else {
            let (weighted, total) = inputs.sensors.iter().zip(&inputs.local_risks).fold(
                (0.0, 0.0),
                |(weighted, total), (s, risk)| {
                    let w = self.policy.sensor.weight(location.planar_distance(&s.location));
                    (weighted + risk * w, total + w)
                },
            );
            if total > 0.0 {
                weighted / total
            } else {
                0.0
            }
        };

        let base_risk = self.policy.combine.base_risk(
            mine_proximity_score,
            geological_score,
            sensor_influence_score,
        );
        let risk_score =
            (base_risk * inputs.weather_multiplier).clamp(0.0, self.policy.effective_ceiling());

        RiskCell {
            id: RiskCell::cell_id(row, col),
            row,
            col,
            location,
            risk_score,
            level: self.thresholds.classify(risk_score),
            mine_proximity_score,
            geological_score,
            sensor_influence_score,
            weather_impact_score: inputs.weather_impact,
        }
    }

    fn geological_noise<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<f64> {
        let std = self.policy.geology.noise_std;
        if !(std.is_finite() && std > 0.0) {
            return vec![0.0; count];
        }
        match Normal::new(0.0, std) {
            Ok(normal) => (0..count).map(|_| normal.sample(rng)).collect(),
            Err(_) => vec![0.0; count],
        }
    }
}

impl Default for RiskFusionEngine {
    fn default() -> Self {
        Self::new(FusionPolicy::default(), ThresholdPolicy::default())
    }
}
