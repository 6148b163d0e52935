//! Point sensors: sample type, summary statistics, and the sources that
//! produce samples (synthetic generator or live telemetry feed).

mod feed;
mod simulated;

pub use feed::{parse_sensor_array, HttpSensorFeed, RawSensor};
pub use simulated::SimulatedSensors;

use crate::error::SensorError;
use crate::geo::Coordinate;
use crate::weather::finite_or_zero;
use serde::{Deserialize, Serialize};

/// One sensor reading at a fixed location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    pub sensor_id: String,
    pub location: Coordinate,
    pub displacement_mm: f64,
    pub pore_pressure_kpa: f64,
    pub vibration_g: f64,
}

impl SensorSample {
    pub fn new(
        sensor_id: impl Into<String>,
        location: Coordinate,
        displacement_mm: f64,
        pore_pressure_kpa: f64,
        vibration_g: f64,
    ) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            location,
            displacement_mm,
            pore_pressure_kpa,
            vibration_g,
        }
    }

    /// Copy with every non-finite measurement replaced by zero.
    pub fn sanitized(&self) -> Self {
        Self {
            sensor_id: self.sensor_id.clone(),
            location: self.location,
            displacement_mm: finite_or_zero(self.displacement_mm),
            pore_pressure_kpa: finite_or_zero(self.pore_pressure_kpa),
            vibration_g: finite_or_zero(self.vibration_g),
        }
    }
}

/// Peak readings across the sensor set. All zero when there are no sensors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorStats {
    pub max_displacement_mm: f64,
    pub max_pore_pressure_kpa: f64,
    pub max_vibration_g: f64,
    pub active_sensors: usize,
}

impl SensorStats {
    pub fn from_samples(samples: &[SensorSample]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let max = |f: fn(&SensorSample) -> f64| {
            samples
                .iter()
                .map(f)
                .fold(f64::NEG_INFINITY, f64::max)
        };
        Self {
            max_displacement_mm: max(|s| s.displacement_mm),
            max_pore_pressure_kpa: max(|s| s.pore_pressure_kpa),
            max_vibration_g: max(|s| s.vibration_g),
            active_sensors: samples.len(),
        }
    }
}

/// Supplies the current sensor set. Live and simulated sources are interchangeable.
pub trait SensorSource: Send + Sync {
    fn get_sensors(&self) -> Result<Vec<SensorSample>, SensorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_take_per_field_maxima() {
        let samples = vec![
            SensorSample::new("S0", Coordinate::default(), 1.0, 45.0, 0.01),
            SensorSample::new("S1", Coordinate::default(), 4.5, 22.0, 0.03),
        ];
        let stats = SensorStats::from_samples(&samples);
        assert_eq!(stats.max_displacement_mm, 4.5);
        assert_eq!(stats.max_pore_pressure_kpa, 45.0);
        assert_eq!(stats.max_vibration_g, 0.03);
        assert_eq!(stats.active_sensors, 2);
    }

    #[test]
    fn stats_of_no_sensors_are_zero() {
        assert_eq!(SensorStats::from_samples(&[]), SensorStats::default());
    }
}
