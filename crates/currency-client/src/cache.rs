use chrono::{DateTime, Utc};
use currency_config::PluginConfig;
use currency_core::{Clock, RateTable, Result, SystemClock};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::source::{HttpRateSource, RateSource};

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Arc<RateTable>,
    fetched_at: DateTime<Utc>,
}

/// Serves the latest rate table, refetching once the cached copy is older
/// than the configured duration and falling back to the stale copy when a
/// refetch fails.
pub struct RateService {
    source: Arc<dyn RateSource>,
    clock: Arc<dyn Clock>,
    cache_duration: Duration,
    cache: Mutex<Option<CacheEntry>>,
}

impl RateService {
    pub fn new(
        source: Arc<dyn RateSource>,
        clock: Arc<dyn Clock>,
        cache_duration: Duration,
    ) -> Self {
        Self {
            source,
            clock,
            cache_duration,
            cache: Mutex::new(None),
        }
    }

    pub fn from_config(config: &PluginConfig) -> Result<Self> {
        let source = HttpRateSource::new(config.api_url.clone())?;
        Ok(Self::new(
            Arc::new(source),
            Arc::new(SystemClock),
            config.cache_ttl(),
        ))
    }

    pub async fn get_rates(&self) -> Result<Arc<RateTable>> {
        let now = self.clock.now();
        let cached = self.entry();

        if let Some(entry) = &cached {
            if self.is_fresh(entry, now) {
                debug!("Serving cached rates");
                return Ok(Arc::clone(&entry.data));
            }
        }

        // The lock is not held across the fetch; concurrent misses each fetch.
        match self.source.fetch().await {
            Ok(table) => {
                let data = Arc::new(table);
                *self.lock() = Some(CacheEntry {
                    data: Arc::clone(&data),
                    fetched_at: now,
                });
                info!("Rate cache refreshed ({} rates)", data.rates.len());
                Ok(data)
            }
            Err(e) => match cached {
                Some(entry) => {
                    warn!("Rate fetch failed, serving stale data: {}", e);
                    Ok(entry.data)
                }
                None => Err(e),
            },
        }
    }

    /// Current cached table together with its age.
    pub fn cached(&self) -> Option<(Arc<RateTable>, chrono::Duration)> {
        let now = self.clock.now();
        self.entry()
            .map(|entry| (entry.data, now.signed_duration_since(entry.fetched_at)))
    }

    pub fn invalidate(&self) {
        *self.lock() = None;
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        match now.signed_duration_since(entry.fetched_at).to_std() {
            Ok(age) => age < self.cache_duration,
            // Clock went backwards
            Err(_) => true,
        }
    }

    fn entry(&self) -> Option<CacheEntry> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<CacheEntry>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
