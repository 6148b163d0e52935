//! Synthetic sensor generator for demos and offline runs.

use super::{SensorSample, SensorSource};
use crate::error::SensorError;
use crate::geo::Coordinate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Generates `count` sensors jittered uniformly inside a `jitter_deg` box around
/// the center, with readings drawn uniformly from bounded ranges:
/// displacement 0–5 mm, pore pressure 20–50 kPa, vibration 0–0.05 g.
pub struct SimulatedSensors {
    center: Coordinate,
    count: usize,
    jitter_deg: f64,
    rng: Mutex<StdRng>,
}

impl SimulatedSensors {
    pub fn new(center: Coordinate, count: usize, jitter_deg: f64) -> Self {
        Self::with_rng(center, count, jitter_deg, StdRng::from_entropy())
    }

    pub fn seeded(center: Coordinate, count: usize, jitter_deg: f64, seed: u64) -> Self {
        Self::with_rng(center, count, jitter_deg, StdRng::seed_from_u64(seed))
    }

    fn with_rng(center: Coordinate, count: usize, jitter_deg: f64, rng: StdRng) -> Self {
        Self {
            center,
            count,
            jitter_deg,
            rng: Mutex::new(rng),
        }
    }

    /// Draw one sensor set from `rng`. The source's own seed applies only
    /// through `get_sensors`.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<SensorSample> {
        (0..self.count)
            .map(|i| {
                let location = self.center.offset(
                    (rng.gen::<f64>() - 0.5) * self.jitter_deg,
                    (rng.gen::<f64>() - 0.5) * self.jitter_deg,
                );
                SensorSample::new(
                    format!("S{}", i),
                    location,
                    rng.gen_range(0.0..5.0),
                    rng.gen_range(20.0..50.0),
                    rng.gen_range(0.0..0.05),
                )
            })
            .collect()
    }
}

impl SensorSource for SimulatedSensors {
    fn get_sensors(&self) -> Result<Vec<SensorSample>, SensorError> {
        let mut rng = match self.rng.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(self.generate(&mut *rng))
    }
}
