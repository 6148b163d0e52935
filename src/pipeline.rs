//! Assessment pipeline: weather + sensors → fusion → classification and alerts.

use crate::config::{SensorSourceKind, SiteConfig, WeatherProviderKind};
use crate::error::GridError;
use crate::risk::{AlertRules, GridParams, RiskFusionEngine, RiskGrid, RiskLevel};
use crate::sensors::{HttpSensorFeed, SensorSource, SimulatedSensors};
use crate::weather::{DataSource, OpenWeatherMapProvider, WeatherCache, WeatherSource};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

/// Site-wide view of one grid.
#[derive(Debug, Clone, Serialize)]
pub struct SiteAssessment {
    pub grid: RiskGrid,
    /// Mean cell risk
    pub base_risk: f64,
    /// Worst cell risk; drives the site level
    pub enhanced_risk: f64,
    pub level: RiskLevel,
    pub level_label: String,
    pub alerts: Vec<String>,
    pub data_source: DataSource,
}

/// Compact, grid-free form of an assessment for one-line logging.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentSummary<'a> {
    pub grid_id: Uuid,
    pub computed_at: DateTime<Utc>,
    pub level: &'a str,
    pub base_risk: f64,
    pub enhanced_risk: f64,
    pub critical_cells: usize,
    pub active_sensors: usize,
    pub data_source: DataSource,
    pub alerts: &'a [String],
}

impl SiteAssessment {
    pub fn summary(&self) -> AssessmentSummary<'_> {
        AssessmentSummary {
            grid_id: self.grid.id,
            computed_at: self.grid.computed_at,
            level: &self.level_label,
            base_risk: self.base_risk,
            enhanced_risk: self.enhanced_risk,
            critical_cells: self.grid.stats.band_counts.critical,
            active_sensors: self.grid.sensor_stats.active_sensors,
            data_source: self.data_source,
            alerts: &self.alerts,
        }
    }
}

pub struct RiskPipeline {
    weather: WeatherSource,
    sensors: Box<dyn SensorSource>,
    engine: RiskFusionEngine,
    params: GridParams,
    alert_rules: AlertRules,
    geology_seed: Option<u64>,
}

impl RiskPipeline {
    pub fn new(
        weather: WeatherSource,
        sensors: Box<dyn SensorSource>,
        engine: RiskFusionEngine,
        params: GridParams,
    ) -> Self {
        Self {
            weather,
            sensors,
            engine,
            params,
            alert_rules: AlertRules::default(),
            geology_seed: None,
        }
    }

    pub fn with_alert_rules(mut self, rules: AlertRules) -> Self {
        self.alert_rules = rules;
        self
    }

    pub fn with_geology_seed(mut self, seed: Option<u64>) -> Self {
        self.geology_seed = seed;
        self
    }

    /// Build the pipeline described by `config`. Lattice parameters are
    /// validated here so misconfiguration is reported before the first cycle.
    pub fn from_config(config: &SiteConfig) -> Result<Self, GridError> {
        let params = config.grid_params();
        params.validate()?;

        let weather = match config.weather.provider {
            WeatherProviderKind::OpenWeatherMap => match OpenWeatherMapProvider::new(&config.weather) {
                Ok(provider) => WeatherSource::new(
                    params.center,
                    Box::new(provider),
                    WeatherCache::from_secs(config.weather.cache_ttl_secs),
                ),
                Err(e) => {
                    warn!(error = %e, "weather provider unavailable; running on simulated weather");
                    WeatherSource::offline(params.center)
                }
            },
            WeatherProviderKind::Simulated => WeatherSource::offline(params.center),
        };

        let simulated = || -> Box<dyn SensorSource> {
            Box::new(SimulatedSensors::new(
                params.center,
                config.sensors.simulated_count,
                config.sensors.jitter_deg,
            ))
        };
        let sensors: Box<dyn SensorSource> = match config.sensors.source {
            SensorSourceKind::Simulated => simulated(),
            SensorSourceKind::Http => match HttpSensorFeed::new(&config.sensors) {
                Some(feed) => Box::new(feed),
                None => {
                    warn!("sensor feed endpoint missing; using simulated sensors");
                    simulated()
                }
            },
        };

        let engine = RiskFusionEngine::new(config.fusion.clone(), config.classification.clone());
        Ok(Self::new(weather, sensors, engine, params)
            .with_alert_rules(config.alerts.clone())
            .with_geology_seed(config.grid.geology_seed))
    }

    pub fn params(&self) -> &GridParams {
        &self.params
    }

    pub fn engine(&self) -> &RiskFusionEngine {
        &self.engine
    }

    /// One fusion call over the current weather and sensor set.
    pub fn compute_risk_grid(&self) -> Result<RiskGrid, GridError> {
        let weather = self.weather.get_weather();
        let sensors = match self.sensors.get_sensors() {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "sensor source failed; fusing without sensors");
                Vec::new()
            }
        };
        match self.geology_seed {
            Some(seed) => self
                .engine
                .compute_grid_seeded(&weather, &sensors, &self.params, seed),
            None => self.engine.compute_grid(&weather, &sensors, &self.params),
        }
    }

    pub fn derive_alerts(&self, grid: &RiskGrid) -> Vec<String> {
        self.alert_rules.derive(grid)
    }

    /// Grid plus site-wide level and alerts.
    pub fn assess(&self) -> Result<SiteAssessment, GridError> {
        let grid = self.compute_risk_grid()?;
        let assessment = self.assessment_of(grid);
        info!(
            grid_id = %assessment.grid.id,
            level = %assessment.level_label,
            enhanced_risk = assessment.enhanced_risk,
            base_risk = assessment.base_risk,
            alerts = assessment.alerts.len(),
            data_source = ?assessment.data_source,
            "site assessment"
        );
        Ok(assessment)
    }

    pub fn assessment_of(&self, grid: RiskGrid) -> SiteAssessment {
        let alerts = self.derive_alerts(&grid);
        let level = grid.site_level();
        SiteAssessment {
            base_risk: grid.stats.average_risk,
            enhanced_risk: grid.stats.max_risk,
            level,
            level_label: grid.classification.label(level).to_string(),
            alerts,
            data_source: grid.data_source(),
            grid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SensorError;
    use crate::geo::Coordinate;
    use crate::risk::{ThresholdPolicy, DISPLACEMENT_ALERT};
    use crate::sensors::SensorSample;

    struct FixedSensors(Vec<SensorSample>);

    impl SensorSource for FixedSensors {
        fn get_sensors(&self) -> Result<Vec<SensorSample>, SensorError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenFeed;

    impl SensorSource for BrokenFeed {
        fn get_sensors(&self) -> Result<Vec<SensorSample>, SensorError> {
            Err(SensorError::Status(502))
        }
    }

    fn params() -> GridParams {
        GridParams {
            size: 10,
            cell_size_deg: 0.0008,
            center: Coordinate::default(),
        }
    }

    #[test]
    fn failing_sensor_feed_degrades_to_no_sensors() {
        let pipeline = RiskPipeline::new(
            WeatherSource::offline(Coordinate::default()),
            Box::new(BrokenFeed),
            RiskFusionEngine::default(),
            params(),
        );
        let grid = pipeline.compute_risk_grid().unwrap();
        assert_eq!(grid.sensor_stats.active_sensors, 0);
        assert!(grid.cells.iter().all(|c| c.sensor_influence_score == 0.0));
    }

    #[test]
    fn assessment_reports_displacement_and_simulated_source() {
        let sensor = SensorSample::new("S0", Coordinate::default(), 5.0, 30.0, 0.01);
        let pipeline = RiskPipeline::new(
            WeatherSource::offline(Coordinate::default()),
            Box::new(FixedSensors(vec![sensor])),
            RiskFusionEngine::default(),
            params(),
        );
        let a = pipeline.assess().unwrap();
        assert!(a.alerts.iter().any(|m| m == DISPLACEMENT_ALERT));
        assert_eq!(a.data_source, DataSource::Simulated);
        assert_eq!(a.enhanced_risk, a.grid.stats.max_risk);
        assert_eq!(a.level, ThresholdPolicy::standard().classify(a.enhanced_risk));
        assert_eq!(a.summary().active_sensors, 1);
    }

    #[test]
    fn seeded_pipeline_is_stable_across_calls() {
        let pipeline = RiskPipeline::new(
            WeatherSource::offline(Coordinate::default()),
            Box::new(FixedSensors(Vec::new())),
            RiskFusionEngine::default(),
            params(),
        )
        .with_geology_seed(Some(42));
        let a = pipeline.compute_risk_grid().unwrap();
        let b = pipeline.compute_risk_grid().unwrap();
        let geo = |g: &RiskGrid| g.cells.iter().map(|c| c.geological_score).collect::<Vec<_>>();
        assert_eq!(geo(&a), geo(&b));
    }

    #[test]
    fn config_with_bad_lattice_is_rejected() {
        let mut config = SiteConfig::default();
        config.grid.size = 0;
        assert!(matches!(
            RiskPipeline::from_config(&config),
            Err(GridError::InvalidLatticeSize(0))
        ));
    }

    #[test]
    fn strict_policy_labels_top_band_imminent() {
        let mut config = SiteConfig::default();
        config.weather.provider = WeatherProviderKind::Simulated;
        config.classification = ThresholdPolicy::strict();
        let pipeline = RiskPipeline::from_config(&config).unwrap();
        let mut grid = pipeline.compute_risk_grid().unwrap();
        grid.stats.max_risk = 0.95;
        let a = pipeline.assessment_of(grid);
        assert_eq!(a.level, RiskLevel::Critical);
        assert_eq!(a.level_label, "Imminent");
    }
}
