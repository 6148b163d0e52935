//! Cached weather with a synthetic fallback. `get_weather` never fails.

use super::{Clock, DataSource, SystemClock, WeatherCache, WeatherCondition, WeatherProvider, WeatherSnapshot};
use crate::geo::Coordinate;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Plausible mid-range conditions with no rainfall, tagged `Simulated`.
pub fn simulated_snapshot<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> WeatherSnapshot {
    WeatherSnapshot {
        temperature_c: 28.0 + rng.gen::<f64>() * 5.0,
        humidity_pct: 60.0 + rng.gen::<f64>() * 20.0,
        wind_speed: 5.0 + rng.gen::<f64>() * 10.0,
        condition: WeatherCondition::Clouds,
        rainfall_24h_mm: 0.0,
        rainfall_72h_mm: 0.0,
        max_rain_intensity: 0.0,
        data_source: DataSource::Simulated,
        fetched_at: now,
    }
}

pub struct WeatherSource {
    site: Coordinate,
    provider: Option<Box<dyn WeatherProvider>>,
    cache: WeatherCache,
    clock: Arc<dyn Clock>,
}

impl WeatherSource {
    pub fn new(site: Coordinate, provider: Box<dyn WeatherProvider>, cache: WeatherCache) -> Self {
        Self::with_clock(site, Some(provider), cache, Arc::new(SystemClock))
    }

    /// Source with no external provider: every call yields a simulated snapshot.
    pub fn offline(site: Coordinate) -> Self {
        Self::with_clock(site, None, WeatherCache::from_secs(0), Arc::new(SystemClock))
    }

    pub fn with_clock(
        site: Coordinate,
        provider: Option<Box<dyn WeatherProvider>>,
        cache: WeatherCache,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            site,
            provider,
            cache,
            clock,
        }
    }

    pub fn site(&self) -> Coordinate {
        self.site
    }

    /// Current weather for the site.
    ///
    /// A fresh cached snapshot is returned without touching the provider. On a
    /// miss the provider is called outside the cache lock; success is cached,
    /// failure yields a simulated snapshot which is not cached.
    pub fn get_weather(&self) -> WeatherSnapshot {
        let now = self.clock.now();
        if let Some(cached) = self.cache.get(now) {
            debug!(fetched_at = %cached.fetched_at, "weather cache hit");
            return cached;
        }

        let Some(provider) = self.provider.as_ref() else {
            debug!("no weather provider configured; using simulated snapshot");
            return simulated_snapshot(&mut rand::thread_rng(), now);
        };

        match provider.fetch(self.site, now) {
            Ok(snapshot) => {
                let snapshot = snapshot.sanitized();
                info!(
                    condition = ?snapshot.condition,
                    rainfall_24h_mm = snapshot.rainfall_24h_mm,
                    rainfall_72h_mm = snapshot.rainfall_72h_mm,
                    "live weather fetched"
                );
                self.cache.store(snapshot.clone());
                snapshot
            }
            Err(e) => {
                warn!(error = %e, "weather fetch failed; using simulated snapshot");
                simulated_snapshot(&mut rand::thread_rng(), now)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WeatherError;
    use chrono::{Duration, TimeZone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeClock(Mutex<DateTime<Utc>>);

    impl FakeClock {
        fn advance(&self, by: Duration) {
            let mut t = self.0.lock().unwrap();
            *t = *t + by;
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    struct CountingProvider(Arc<AtomicUsize>);

    impl WeatherProvider for CountingProvider {
        fn fetch(&self, _site: Coordinate, fetched_at: DateTime<Utc>) -> Result<WeatherSnapshot, WeatherError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(WeatherSnapshot {
                humidity_pct: 75.0,
                condition: WeatherCondition::Rain,
                rainfall_24h_mm: 12.0,
                data_source: DataSource::Live,
                fetched_at,
                ..Default::default()
            })
        }
    }

    struct FailingProvider;

    impl WeatherProvider for FailingProvider {
        fn fetch(&self, _site: Coordinate, _at: DateTime<Utc>) -> Result<WeatherSnapshot, WeatherError> {
            Err(WeatherError::Status(503))
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 6, 0, 0).unwrap()
    }

    #[test]
    fn second_call_within_ttl_is_served_from_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let clock = Arc::new(FakeClock(Mutex::new(t0())));
        let source = WeatherSource::with_clock(
            Coordinate::default(),
            Some(Box::new(CountingProvider(calls.clone()))),
            WeatherCache::from_secs(900),
            clock.clone(),
        );

        let first = source.get_weather();
        clock.advance(Duration::seconds(600));
        let second = source.get_weather();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.fetched_at, second.fetched_at);
        assert_eq!(first, second);

        clock.advance(Duration::seconds(300));
        let third = source.get_weather();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(third.fetched_at, t0() + Duration::seconds(900));
    }

    #[test]
    fn failing_provider_falls_back_and_is_not_cached() {
        let clock = Arc::new(FakeClock(Mutex::new(t0())));
        let source = WeatherSource::with_clock(
            Coordinate::default(),
            Some(Box::new(FailingProvider)),
            WeatherCache::from_secs(900),
            clock,
        );
        let s = source.get_weather();
        assert_eq!(s.data_source, DataSource::Simulated);
        assert_eq!(s.rainfall_24h_mm, 0.0);
        assert!(source.cache.get(t0()).is_none());
    }

    #[test]
    fn offline_source_is_simulated() {
        let s = WeatherSource::offline(Coordinate::default()).get_weather();
        assert_eq!(s.data_source, DataSource::Simulated);
    }

    #[test]
    fn simulated_values_are_mid_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let s = simulated_snapshot(&mut rng, t0());
            assert!((28.0..=33.0).contains(&s.temperature_c));
            assert!((60.0..=80.0).contains(&s.humidity_pct));
            assert_eq!(s.rainfall_72h_mm, 0.0);
            assert_eq!(s.max_rain_intensity, 0.0);
        }
    }
}
