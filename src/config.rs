//! Pipeline configuration with environment-variable overrides.

use crate::nws::retry::RetryPolicy;
use crate::types::coordinate::Coordinate;
use log::warn;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.weather.gov";
pub const DEFAULT_USER_AGENT: &str = "boston-weather-etl (contact@example.com)";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Settings for the NWS API client.
#[derive(Debug, Clone)]
pub struct NwsConfig {
    pub base_url: String,
    /// The NWS API requires an identifying User-Agent with contact info.
    pub user_agent: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for NwsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

/// Settings for a full extraction pipeline. Defaults target Boston, MA.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub coordinate: Coordinate,
    pub db_path: PathBuf,
    /// TTL for cached points metadata.
    pub cache_ttl: Duration,
    pub nws: NwsConfig,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            coordinate: Coordinate::new(42.3601, -71.0589),
            db_path: PathBuf::from("weather.db"),
            cache_ttl: DEFAULT_CACHE_TTL,
            nws: NwsConfig::default(),
        }
    }
}

impl ExtractorConfig {
    /// Defaults overridden by environment variables where set:
    /// `WEATHER_LAT`, `WEATHER_LON`, `WEATHER_DB_PATH`, `NWS_BASE_URL`,
    /// `NWS_USER_AGENT`, `NWS_TIMEOUT_SECS`, `NWS_CACHE_TTL_SECS`.
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(lat) = env_parsed::<f64>("WEATHER_LAT") {
            config.coordinate.latitude = lat;
        }
        if let Some(lon) = env_parsed::<f64>("WEATHER_LON") {
            config.coordinate.longitude = lon;
        }
        if let Ok(path) = env::var("WEATHER_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }
        if let Ok(url) = env::var("NWS_BASE_URL") {
            config.nws.base_url = url;
        }
        if let Ok(agent) = env::var("NWS_USER_AGENT") {
            config.nws.user_agent = agent;
        }
        if let Some(secs) = env_parsed::<u64>("NWS_TIMEOUT_SECS") {
            config.nws.timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_parsed::<u64>("NWS_CACHE_TTL_SECS") {
            config.cache_ttl = Duration::from_secs(secs);
        }

        config
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparseable {name}='{raw}'");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_boston() {
        let config = ExtractorConfig::default();
        assert_eq!(config.coordinate, Coordinate::new(42.3601, -71.0589));
        assert!(config.coordinate.within_nws_coverage());
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.nws.timeout, Duration::from_secs(30));
        assert_eq!(config.nws.retry.max_attempts, 3);
        assert!(config.nws.user_agent.contains("contact@"));
    }
}
