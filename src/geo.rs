//! Geographic primitives.

use serde::{Deserialize, Serialize};

/// A (latitude, longitude) pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Euclidean distance in coordinate space (degrees). Good enough at mine-site scale.
    pub fn planar_distance(&self, other: &Coordinate) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        (dlat * dlat + dlon * dlon).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    pub fn offset(&self, dlat: f64, dlon: f64) -> Self {
        Self::new(self.lat + dlat, self.lon + dlon)
    }
}

impl Default for Coordinate {
    /// Reference mine site (Tamil Nadu, India).
    fn default() -> Self {
        Self::new(11.1053, 79.1506)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_distance_is_symmetric() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(3.0, 4.0);
        assert!((a.planar_distance(&b) - 5.0).abs() < 1e-12);
        assert!((b.planar_distance(&a) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn nan_is_not_finite() {
        assert!(!Coordinate::new(f64::NAN, 1.0).is_finite());
        assert!(Coordinate::default().is_finite());
    }
}
