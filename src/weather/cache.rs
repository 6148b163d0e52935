//! Time-boxed cache holding the last live snapshot.

use super::WeatherSnapshot;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Single-slot cache keyed on the snapshot's `fetched_at`. Expiry is checked
/// lazily on read; there is no background refresh. Concurrent refreshes race
/// and the last `store` wins.
pub struct WeatherCache {
    ttl: Duration,
    slot: Mutex<Option<WeatherSnapshot>>,
}

impl WeatherCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn from_secs(ttl_secs: u64) -> Self {
        let secs = i64::try_from(ttl_secs).unwrap_or(i64::MAX).min(i64::MAX / 1000);
        Self::new(Duration::seconds(secs))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached snapshot if it is still fresh at `now`.
    pub fn get(&self, now: DateTime<Utc>) -> Option<WeatherSnapshot> {
        self.lock()
            .as_ref()
            .filter(|s| now.signed_duration_since(s.fetched_at) < self.ttl)
            .cloned()
    }

    pub fn store(&self, snapshot: WeatherSnapshot) {
        *self.lock() = Some(snapshot);
    }

    pub fn clear(&self) {
        *self.lock() = None;
    }

    // The slot only ever holds whole snapshots, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Option<WeatherSnapshot>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::DataSource;
    use chrono::TimeZone;

    fn snapshot_at(ts: DateTime<Utc>) -> WeatherSnapshot {
        WeatherSnapshot {
            data_source: DataSource::Live,
            fetched_at: ts,
            ..Default::default()
        }
    }

    #[test]
    fn fresh_until_ttl_elapses() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let cache = WeatherCache::from_secs(900);
        cache.store(snapshot_at(t0));
        assert!(cache.get(t0 + Duration::seconds(899)).is_some());
        assert!(cache.get(t0 + Duration::seconds(900)).is_none());
    }

    #[test]
    fn empty_and_cleared_cache_miss() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let cache = WeatherCache::from_secs(60);
        assert!(cache.get(t0).is_none());
        cache.store(snapshot_at(t0));
        cache.clear();
        assert!(cache.get(t0).is_none());
    }

    #[test]
    fn poisoned_lock_still_serves_and_stores() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let cache = std::sync::Arc::new(WeatherCache::from_secs(900));
        cache.store(snapshot_at(t0));

        let holder = cache.clone();
        let _ = std::thread::spawn(move || {
            let _guard = holder.slot.lock().unwrap();
            panic!("refresh panicked while holding the cache");
        })
        .join();
        assert!(cache.slot.is_poisoned());

        assert_eq!(cache.get(t0).map(|s| s.fetched_at), Some(t0));
        let t1 = t0 + Duration::seconds(60);
        cache.store(snapshot_at(t1));
        assert_eq!(cache.get(t1).map(|s| s.fetched_at), Some(t1));
        cache.clear();
        assert!(cache.get(t1).is_none());
    }
}
