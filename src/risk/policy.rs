//! Fusion weights and constants. Defaults are design constants, not calibrated
//! geotechnical parameters; every field is overridable from configuration.

use crate::sensors::SensorSample;
use crate::weather::WeatherSnapshot;
use serde::{Deserialize, Serialize};

/// Version tag carried on every grid computed with a policy.
pub const FUSION_POLICY_VERSION: &str = "fusion-v1";

/// Highest score any cell may carry, whatever `FusionPolicy::ceiling` says.
pub const MAX_RISK_SCORE: f64 = 0.99;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionPolicy {
    pub version: String,
    pub weather: WeatherImpactPolicy,
    pub proximity: ProximityPolicy,
    pub geology: GeologyPolicy,
    pub sensor: SensorRiskPolicy,
    pub combine: CombineWeights,
    /// Upper clamp for cell scores; values above are reserved for certain failure
    pub ceiling: f64,
}

/// Scalar weather impact and the multiplier derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherImpactPolicy {
    pub rain_24h_full_mm: f64,
    pub rain_72h_full_mm: f64,
    pub intensity_full_mm_hr: f64,
    pub rain_24h_weight: f64,
    pub rain_72h_weight: f64,
    pub intensity_weight: f64,
    pub condition_weight: f64,
    pub humidity_weight: f64,
    pub multiplier_base: f64,
    pub multiplier_gain: f64,
}

/// Prior that risk peaks at the site center and decays outward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityPolicy {
    pub peak: f64,
    pub decay: f64,
}

/// Static zonal prior. Quadrants are in lattice terms: rows grow with latitude,
/// columns with longitude, both measured from the lattice midpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeologyPolicy {
    pub northwest: f64,
    pub southeast: f64,
    pub central_band: f64,
    /// Half-width of the central band as a fraction of the lattice size
    pub central_band_fraction: f64,
    pub noise_std: f64,
    pub max: f64,
}

/// Per-sensor local risk and the inverse-distance weighting used to spread it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorRiskPolicy {
    pub displacement_weight: f64,
    pub displacement_full_mm: f64,
    pub pore_pressure_weight: f64,
    pub pore_pressure_full_kpa: f64,
    pub vibration_weight: f64,
    pub vibration_full_g: f64,
    pub cap: f64,
    pub idw_power: f64,
    pub idw_epsilon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombineWeights {
    pub proximity: f64,
    pub geology: f64,
    pub sensor: f64,
}

impl Default for FusionPolicy {
    fn default() -> Self {
        Self {
            version: FUSION_POLICY_VERSION.to_string(),
            weather: WeatherImpactPolicy::default(),
            proximity: ProximityPolicy::default(),
            geology: GeologyPolicy::default(),
            sensor: SensorRiskPolicy::default(),
            combine: CombineWeights::default(),
            ceiling: MAX_RISK_SCORE,
        }
    }
}

impl Default for WeatherImpactPolicy {
    fn default() -> Self {
        Self {
            rain_24h_full_mm: 50.0,
            rain_72h_full_mm: 100.0,
            intensity_full_mm_hr: 25.0,
            rain_24h_weight: 0.35,
            rain_72h_weight: 0.25,
            intensity_weight: 0.20,
            condition_weight: 0.10,
            humidity_weight: 0.10,
            multiplier_base: 1.1,
            multiplier_gain: 0.8,
        }
    }
}

impl Default for ProximityPolicy {
    fn default() -> Self {
        Self {
            peak: 0.85,
            decay: 1.0,
        }
    }
}

impl Default for GeologyPolicy {
    fn default() -> Self {
        Self {
            northwest: 0.35,
            southeast: 0.30,
            central_band: 0.25,
            central_band_fraction: 0.3,
            noise_std: 0.05,
            max: 0.6,
        }
    }
}

impl Default for SensorRiskPolicy {
    fn default() -> Self {
        Self {
            displacement_weight: 0.4,
            displacement_full_mm: 10.0,
            pore_pressure_weight: 0.35,
            pore_pressure_full_kpa: 50.0,
            vibration_weight: 0.25,
            vibration_full_g: 0.5,
            cap: 0.9,
            idw_power: 3.0,
            idw_epsilon: 1e-4,
        }
    }
}

impl Default for CombineWeights {
    fn default() -> Self {
        Self {
            proximity: 0.45,
            geology: 0.35,
            sensor: 0.20,
        }
    }
}

/// `value / full`, clamped to 0..=1. A non-positive `full` disables the term.
fn ratio(value: f64, full: f64) -> f64 {
    if full > 0.0 {
        (value / full).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// `value / full` without clamping; zero when `full` is non-positive.
fn scaled(value: f64, full: f64) -> f64 {
    if full > 0.0 {
        value / full
    } else {
        0.0
    }
}

impl FusionPolicy {
    /// Configured ceiling bounded to `0..=MAX_RISK_SCORE`; a non-finite value
    /// falls back to `MAX_RISK_SCORE`.
    pub fn effective_ceiling(&self) -> f64 {
        if self.ceiling.is_finite() {
            self.ceiling.clamp(0.0, MAX_RISK_SCORE)
        } else {
            MAX_RISK_SCORE
        }
    }
}

impl WeatherImpactPolicy {
    /// Weighted 0..=1 impact of the snapshot.
    pub fn impact(&self, weather: &WeatherSnapshot) -> f64 {
        let rain_24 = ratio(weather.rainfall_24h_mm, self.rain_24h_full_mm);
        let rain_72 = ratio(weather.rainfall_72h_mm, self.rain_72h_full_mm);
        let intensity = ratio(weather.max_rain_intensity, self.intensity_full_mm_hr);
        let condition = weather.condition.score();
        let humidity = ratio(weather.humidity_pct, 100.0);

        self.rain_24h_weight * rain_24
            + self.rain_72h_weight * rain_72
            + self.intensity_weight * intensity
            + self.condition_weight * condition
            + self.humidity_weight * humidity
    }

    pub fn multiplier(&self, impact: f64) -> f64 {
        self.multiplier_base + impact * self.multiplier_gain
    }
}

impl ProximityPolicy {
    /// `normalized_distance` is grid distance from center over the maximum grid diagonal distance.
    pub fn score(&self, normalized_distance: f64) -> f64 {
        self.peak * (-self.decay * normalized_distance).exp()
    }
}

impl GeologyPolicy {
    /// Zonal prior before perturbation. Rules are additive.
    pub fn prior(&self, row: usize, col: usize, size: usize) -> f64 {
        let half = size as f64 / 2.0;
        let (r, c) = (row as f64, col as f64);
        let band = self.central_band_fraction * size as f64;

        let mut prior = 0.0;
        if r < half && c < half {
            prior += self.northwest;
        }
        if r > half && c > half {
            prior += self.southeast;
        }
        if (r - half).abs() < band || (c - half).abs() < band {
            prior += self.central_band;
        }
        prior
    }

    pub fn finalize(&self, prior: f64, noise: f64) -> f64 {
        (prior + noise).clamp(0.0, self.max.max(0.0))
    }
}

impl SensorRiskPolicy {
    /// Local risk at the sensor itself, clamped to `0..=cap`.
    pub fn local_risk(&self, sample: &SensorSample) -> f64 {
        let raw = self.displacement_weight * scaled(sample.displacement_mm, self.displacement_full_mm)
            + self.pore_pressure_weight * scaled(sample.pore_pressure_kpa, self.pore_pressure_full_kpa)
            + self.vibration_weight * scaled(sample.vibration_g, self.vibration_full_g);
        raw.clamp(0.0, self.cap.max(0.0))
    }

    /// Inverse-distance weight for a sensor `distance` away.
    pub fn weight(&self, distance: f64) -> f64 {
        let d = (distance + self.idw_epsilon).max(f64::EPSILON);
        1.0 / d.powf(self.idw_power)
    }
}

impl CombineWeights {
    pub fn base_risk(&self, proximity: f64, geology: f64, sensor: f64) -> f64 {
        self.proximity * proximity + self.geology * geology + self.sensor * sensor
    }
}
