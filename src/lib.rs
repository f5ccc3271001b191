mod config;
mod error;
mod extractor;
mod nws;
mod store;
mod transform;
mod types;

pub use error::ExtractError;
pub use extractor::{CycleSummary, WeatherExtractor};

pub use config::{ExtractorConfig, NwsConfig};

pub use types::coordinate::Coordinate;
pub use types::records::{CurrentWeatherRecord, DailyWeatherRecord, HourlyWeatherRecord};

pub use nws::cache::{CacheStats, Clock, PointsCache, SystemClock};
pub use nws::client::NwsClient;
pub use nws::error::NwsApiError;
pub use nws::points::{resolve_routing, RoutingUrls};
pub use nws::retry::{with_retry, RetryPolicy};
pub use nws::validate::{validate, PayloadKind};

pub use store::{StoreError, UsageStats, WeatherStore};

pub use transform::current::transform_current;
pub use transform::daily::transform_daily;
pub use transform::hourly::transform_hourly;
