//! Hourly-forecast transformer.

use crate::nws::payload::ForecastPayload;
use crate::nws::validate::{validate, PayloadKind};
use crate::transform::units::{compass_to_degrees, icon_for_description, wind_speed_from_text};
use crate::types::records::HourlyWeatherRecord;
use chrono::{DateTime, Utc};
use log::warn;
use serde_json::Value;

/// Maximum number of forecast hours retained per cycle.
pub const HOURLY_CAP: usize = 48;

/// Flatten an hourly forecast payload into up to [`HOURLY_CAP`] records.
///
/// A period without a parseable start time is skipped, not fatal. A
/// structurally unusable payload yields an empty vector.
pub fn transform_hourly(payload: &Value) -> Vec<HourlyWeatherRecord> {
    if !validate(payload, PayloadKind::Hourly) {
        return Vec::new();
    }

    let forecast: ForecastPayload = match serde_json::from_value(payload.clone()) {
        Ok(f) => f,
        Err(e) => {
            warn!("Failed to deserialize hourly forecast: {e}");
            return Vec::new();
        }
    };

    forecast
        .properties
        .periods
        .into_iter()
        .take(HOURLY_CAP)
        .filter_map(|period| {
            let timestamp = period
                .start_time
                .as_deref()
                .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
                .map(|t| t.with_timezone(&Utc));
            let Some(timestamp) = timestamp else {
                warn!("Skipping hourly period with missing or unparseable start time");
                return None;
            };

            let temp = period.temperature_celsius();
            let description = period
                .short_forecast
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "Unknown".to_string());
            let icon = icon_for_description(&description).to_string();

            Some(HourlyWeatherRecord {
                timestamp,
                temp,
                feels_like: temp,
                humidity: period
                    .relative_humidity
                    .as_ref()
                    .and_then(|qv| qv.value)
                    .map(|h| h.round() as i64),
                pressure: None,
                wind_speed: period.wind_speed.as_deref().and_then(wind_speed_from_text),
                wind_deg: period.wind_direction.as_deref().map(compass_to_degrees),
                description,
                icon,
                pop: period.pop_fraction(),
            })
        })
        .collect()
}
