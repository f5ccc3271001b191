//! The extraction orchestrator: one cycle of resolve, fetch, transform,
//! persist.

use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use crate::nws::cache::{CacheStats, PointsCache};
use crate::nws::client::NwsClient;
use crate::nws::payload::StationsPayload;
use crate::nws::points::{resolve_routing, RoutingUrls};
use crate::store::WeatherStore;
use crate::transform::current::transform_current;
use crate::transform::daily::transform_daily;
use crate::transform::hourly::transform_hourly;
use crate::types::coordinate::Coordinate;
use crate::types::records::{CurrentWeatherRecord, DailyWeatherRecord, HourlyWeatherRecord};
use log::{info, warn};

/// What one extraction cycle managed to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleSummary {
    pub current_inserted: bool,
    pub hourly_rows: usize,
    pub daily_rows: usize,
}

/// Owns the client, the metadata cache, and the store for one coordinate.
///
/// `run_cycle` takes `&mut self`, so a single extractor cannot interleave
/// cycles; callers wanting periodic extraction run cycles back to back on one
/// instance.
#[derive(Debug)]
pub struct WeatherExtractor {
    client: NwsClient,
    cache: PointsCache,
    store: WeatherStore,
    coordinate: Coordinate,
}

impl WeatherExtractor {
    /// Build an extractor, opening (or creating) the database at the
    /// configured path.
    pub fn new(config: &ExtractorConfig) -> Result<Self, ExtractError> {
        let store = WeatherStore::open(&config.db_path)?;
        Self::with_store(config, store)
    }

    /// Build an extractor around an existing store. Used by tests with an
    /// in-memory database.
    pub fn with_store(
        config: &ExtractorConfig,
        store: WeatherStore,
    ) -> Result<Self, ExtractError> {
        Ok(Self {
            client: NwsClient::new(&config.nws)?,
            cache: PointsCache::new(config.cache_ttl),
            store,
            coordinate: config.coordinate,
        })
    }

    pub fn store(&self) -> &WeatherStore {
        &self.store
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop expired metadata cache entries; for a periodic maintenance task.
    pub fn sweep_cache(&mut self) -> usize {
        self.cache.sweep()
    }

    /// Run one extraction cycle: resolve routing, fetch the three data kinds,
    /// transform, persist.
    ///
    /// The three fetches are best-effort and independent; a failure in one is
    /// logged and that kind is skipped for the cycle. Metadata resolution
    /// failure aborts the cycle, as does a store failure, since neither
    /// leaves anything useful to do.
    pub async fn run_cycle(&mut self) -> Result<CycleSummary, ExtractError> {
        info!("Starting extraction cycle for {}", self.coordinate);
        let urls = resolve_routing(&self.client, &mut self.cache, self.coordinate).await?;

        let current = self.fetch_current(&urls).await;
        let hourly = self.fetch_hourly(&urls).await;
        let daily = self.fetch_daily(&urls).await;

        let mut summary = CycleSummary::default();
        if let Some(record) = current {
            self.store.insert_current(&record)?;
            info!("Current conditions: {}", record.summary());
            summary.current_inserted = true;
        }
        summary.hourly_rows = self.store.insert_hourly(&hourly)?;
        summary.daily_rows = self.store.insert_daily(&daily)?;

        info!(
            "Extraction cycle complete: current={}, hourly={}, daily={}",
            summary.current_inserted, summary.hourly_rows, summary.daily_rows
        );
        Ok(summary)
    }

    /// Resolve an observation station and fetch its latest observation.
    /// Stations without data are skipped in listed order; `None` means no
    /// current conditions this cycle.
    async fn fetch_current(&self, urls: &RoutingUrls) -> Option<CurrentWeatherRecord> {
        let payload = match self.client.request(&urls.observation_stations).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to fetch station list: {e}");
                return None;
            }
        };
        let stations: StationsPayload = match serde_json::from_value(payload) {
            Ok(stations) => stations,
            Err(e) => {
                warn!("Failed to deserialize station list: {e}");
                return None;
            }
        };

        let ids: Vec<String> = stations
            .features
            .into_iter()
            .filter_map(|feature| feature.properties.station_identifier)
            .collect();
        if ids.is_empty() {
            warn!("No observation stations available for {}", self.coordinate);
            return None;
        }

        for id in ids {
            let url = self.client.latest_observation_url(&id);
            match self.client.request(&url).await {
                Ok(payload) => {
                    if let Some(record) = transform_current(&payload) {
                        info!("Using latest observation from station {id}");
                        return Some(record);
                    }
                    warn!("Station {id} returned an unusable observation, trying next");
                }
                Err(e) => warn!("Failed to fetch observation from station {id}: {e}"),
            }
        }
        warn!("No station yielded current conditions this cycle");
        None
    }

    async fn fetch_hourly(&self, urls: &RoutingUrls) -> Vec<HourlyWeatherRecord> {
        match self.client.request(&urls.forecast_hourly).await {
            Ok(payload) => transform_hourly(&payload),
            Err(e) => {
                warn!("Failed to fetch hourly forecast: {e}");
                Vec::new()
            }
        }
    }

    async fn fetch_daily(&self, urls: &RoutingUrls) -> Vec<DailyWeatherRecord> {
        match self.client.request(&urls.forecast).await {
            Ok(payload) => transform_daily(&payload),
            Err(e) => {
                warn!("Failed to fetch daily forecast: {e}");
                Vec::new()
            }
        }
    }
}
