//! Daily-forecast transformer.
//!
//! The daily forecast endpoint reports day/night half-day periods; this
//! module regroups them into one record per calendar date.

use crate::nws::payload::{ForecastPayload, ForecastPeriod};
use crate::nws::validate::{validate, PayloadKind};
use crate::transform::units::{compass_to_degrees, icon_for_description, wind_speed_from_text};
use crate::types::records::DailyWeatherRecord;
use chrono::{DateTime, NaiveDate};
use log::warn;
use serde_json::Value;
use std::collections::BTreeMap;

/// Maximum number of calendar dates retained per cycle.
pub const DAILY_CAP: usize = 7;

/// When only one of min/max temperature is known, the other is estimated at
/// this offset. A documented approximation carried over from the upstream
/// schema, not a meteorological model.
const TEMP_SPREAD_ESTIMATE: f64 = 5.0;

#[derive(Default)]
struct HalfDay {
    temp: Option<f64>,
    humidity: Option<i64>,
    wind_speed: Option<f64>,
    wind_deg: Option<i64>,
    description: Option<String>,
}

impl HalfDay {
    fn from_period(period: &ForecastPeriod) -> Self {
        Self {
            temp: period.temperature_celsius(),
            humidity: period
                .relative_humidity
                .as_ref()
                .and_then(|qv| qv.value)
                .map(|h| h.round() as i64),
            wind_speed: period.wind_speed.as_deref().and_then(wind_speed_from_text),
            wind_deg: period.wind_direction.as_deref().map(compass_to_degrees),
            description: period.short_forecast.clone().filter(|d| !d.is_empty()),
        }
    }
}

#[derive(Default)]
struct DayAccumulator {
    day: HalfDay,
    night: HalfDay,
    pop: f64,
}

/// Flatten a daily forecast payload into up to [`DAILY_CAP`] records, one per
/// calendar date, sorted ascending. Wind, description, and icon prefer the
/// daytime period; POP is the maximum across the date's periods.
pub fn transform_daily(payload: &Value) -> Vec<DailyWeatherRecord> {
    if !validate(payload, PayloadKind::Daily) {
        return Vec::new();
    }

    let forecast: ForecastPayload = match serde_json::from_value(payload.clone()) {
        Ok(f) => f,
        Err(e) => {
            warn!("Failed to deserialize daily forecast: {e}");
            return Vec::new();
        }
    };

    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
    for period in &forecast.properties.periods {
        let date = period
            .start_time
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|t| t.date_naive());
        let Some(date) = date else {
            warn!("Skipping daily period with missing or unparseable start time");
            continue;
        };

        let acc = days.entry(date).or_default();
        acc.pop = acc.pop.max(period.pop_fraction());
        if period.is_daytime.unwrap_or(true) {
            acc.day = HalfDay::from_period(period);
        } else {
            acc.night = HalfDay::from_period(period);
        }
    }

    days.into_iter()
        .take(DAILY_CAP)
        .map(|(date, acc)| build_record(date, acc))
        .collect()
}

fn build_record(date: NaiveDate, acc: DayAccumulator) -> DailyWeatherRecord {
    let mut temp_max = acc.day.temp;
    let mut temp_min = acc.night.temp;
    match (temp_max, temp_min) {
        (Some(max), None) => temp_min = Some(max - TEMP_SPREAD_ESTIMATE),
        (None, Some(min)) => temp_max = Some(min + TEMP_SPREAD_ESTIMATE),
        _ => {}
    }
    let temp_day = acc.day.temp.or(temp_max);
    let temp_night = acc.night.temp.or(temp_min);

    let description = acc
        .day
        .description
        .or(acc.night.description)
        .unwrap_or_else(|| "Unknown".to_string());
    let icon = icon_for_description(&description).to_string();

    DailyWeatherRecord {
        date,
        temp_min,
        temp_max,
        temp_day,
        temp_night,
        humidity: acc.day.humidity.or(acc.night.humidity),
        pressure: None,
        wind_speed: acc.day.wind_speed.or(acc.night.wind_speed),
        wind_deg: acc.day.wind_deg.or(acc.night.wind_deg),
        description,
        icon,
        pop: acc.pop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn period(start: &str, is_daytime: bool, temp_f: f64, pop: i64) -> Value {
        json!({
            "startTime": start,
            "isDaytime": is_daytime,
            "temperature": temp_f,
            "temperatureUnit": "F",
            "windSpeed": "10 mph",
            "windDirection": (if is_daytime { "NW" } else { "N" }),
            "shortForecast": (if is_daytime { "Sunny" } else { "Clear" }),
            "probabilityOfPrecipitation": { "value": pop },
            "relativeHumidity": { "value": (if is_daytime { 55 } else { 75 }) }
        })
    }

    fn daily_payload(periods: Vec<Value>) -> Value {
        json!({ "properties": { "periods": periods } })
    }

    #[test]
    fn day_and_night_periods_merge_into_one_record() {
        let records = transform_daily(&daily_payload(vec![
            period("2024-03-01T06:00:00-05:00", true, 45.0, 20),
            period("2024-03-01T18:00:00-05:00", false, 32.0, 40),
        ]));
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!((r.temp_day.unwrap() - 7.2).abs() < 0.1);
        assert!((r.temp_night.unwrap() - 0.0).abs() < 0.1);
        assert_eq!(r.temp_max, r.temp_day);
        assert_eq!(r.temp_min, r.temp_night);
        assert!((r.pop - 0.4).abs() < 1e-9);
        // daytime period wins wind/description/icon
        assert_eq!(r.wind_deg, Some(315));
        assert_eq!(r.description, "Sunny");
        assert_eq!(r.icon, "01d");
        assert_eq!(r.humidity, Some(55));
    }

    #[test]
    fn missing_night_backfills_min_from_max() {
        let records = transform_daily(&daily_payload(vec![period(
            "2024-03-01T06:00:00-05:00",
            true,
            41.0,
            0,
        )]));
        let r = &records[0];
        assert!((r.temp_max.unwrap() - 5.0).abs() < 0.1);
        assert!((r.temp_min.unwrap() - 0.0).abs() < 0.1);
        assert_eq!(r.temp_night, r.temp_min);
    }

    #[test]
    fn missing_day_backfills_max_from_min() {
        let records = transform_daily(&daily_payload(vec![period(
            "2024-03-01T18:00:00-05:00",
            false,
            32.0,
            0,
        )]));
        let r = &records[0];
        assert!((r.temp_min.unwrap() - 0.0).abs() < 0.1);
        assert!((r.temp_max.unwrap() - 5.0).abs() < 0.1);
        assert_eq!(r.temp_day, r.temp_max);
        // night period supplies wind/description when no day period exists
        assert_eq!(r.description, "Clear");
        assert_eq!(r.wind_deg, Some(0));
    }

    #[test]
    fn dates_are_sorted_and_capped_at_seven() {
        let mut periods = Vec::new();
        // feed ten dates in reverse order
        for d in (1..=10).rev() {
            periods.push(period(&format!("2024-03-{d:02}T06:00:00-05:00"), true, 50.0, 0));
            periods.push(period(&format!("2024-03-{d:02}T18:00:00-05:00"), false, 35.0, 0));
        }
        let records = transform_daily(&daily_payload(periods));
        assert_eq!(records.len(), DAILY_CAP);
        for (i, r) in records.iter().enumerate() {
            assert_eq!(r.date, NaiveDate::from_ymd_opt(2024, 3, 1 + i as u32).unwrap());
        }
    }

    #[test]
    fn invalid_payload_yields_empty() {
        assert!(transform_daily(&json!({})).is_empty());
        assert!(transform_daily(&json!({ "properties": { "periods": 5 } })).is_empty());
    }
}
