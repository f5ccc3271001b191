//! Canonical flat record shapes persisted by the pipeline.
//!
//! The three record types are independent rows correlated only by time and
//! coordinate at the pipeline level. Optional fields stay optional all the way
//! into storage; the transformers decide per-field whether a missing value is
//! acceptable.

use chrono::{DateTime, NaiveDate, Utc};

/// One current-conditions observation. Each extraction cycle appends a new row.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWeatherRecord {
    pub timestamp: DateTime<Utc>,
    /// Temperature in degrees Celsius.
    pub temp: Option<f64>,
    /// Apparent temperature in degrees Celsius (heat index, wind chill, or
    /// the plain temperature when neither is reported).
    pub feels_like: Option<f64>,
    /// Relative humidity, 0-100 percent.
    pub humidity: Option<i64>,
    /// Barometric pressure in hectopascals.
    pub pressure: Option<i64>,
    /// Wind speed in meters per second.
    pub wind_speed: Option<f64>,
    /// Wind direction in degrees, 0-359.
    pub wind_deg: Option<i64>,
    pub description: String,
    pub icon: String,
}

impl CurrentWeatherRecord {
    /// Human-readable one-liner for logging after a successful insert.
    pub fn summary(&self) -> String {
        let temp = self
            .temp
            .map_or_else(|| "N/A".to_string(), |t| format!("{t:.1}°C"));
        let humidity = self
            .humidity
            .map_or_else(|| "N/A".to_string(), |h| h.to_string());
        let wind = self
            .wind_speed
            .map_or_else(|| "N/A".to_string(), |w| format!("{w:.1}"));
        format!(
            "{temp}, {}, Humidity: {humidity}%, Wind: {wind} m/s",
            self.description
        )
    }
}

/// One forecast hour; up to 48 retained per extraction cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyWeatherRecord {
    pub timestamp: DateTime<Utc>,
    pub temp: Option<f64>,
    /// The hourly forecast carries no separate apparent-temperature signal,
    /// so this mirrors `temp`.
    pub feels_like: Option<f64>,
    pub humidity: Option<i64>,
    /// Not reported by the NWS hourly forecast; always `None`.
    pub pressure: Option<i64>,
    pub wind_speed: Option<f64>,
    pub wind_deg: Option<i64>,
    pub description: String,
    pub icon: String,
    /// Probability of precipitation as a 0.0-1.0 fraction.
    pub pop: f64,
}

/// One calendar date assembled from a daytime and a nighttime forecast period;
/// up to 7 retained per extraction cycle, sorted ascending by date.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyWeatherRecord {
    pub date: NaiveDate,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub temp_day: Option<f64>,
    pub temp_night: Option<f64>,
    pub humidity: Option<i64>,
    pub pressure: Option<i64>,
    pub wind_speed: Option<f64>,
    pub wind_deg: Option<i64>,
    pub description: String,
    pub icon: String,
    /// Maximum probability of precipitation across the date's periods.
    pub pop: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn summary_formats_available_fields() {
        let record = CurrentWeatherRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            temp: Some(4.95),
            feels_like: Some(2.1),
            humidity: Some(80),
            pressure: Some(1013),
            wind_speed: Some(4.47),
            wind_deg: Some(315),
            description: "Partly Cloudy".to_string(),
            icon: "02d".to_string(),
        };
        assert_eq!(
            record.summary(),
            "5.0°C, Partly Cloudy, Humidity: 80%, Wind: 4.5 m/s"
        );
    }

    #[test]
    fn summary_tolerates_missing_fields() {
        let record = CurrentWeatherRecord {
            timestamp: Utc::now(),
            temp: None,
            feels_like: None,
            humidity: None,
            pressure: None,
            wind_speed: None,
            wind_deg: None,
            description: "Unknown".to_string(),
            icon: "01d".to_string(),
        };
        assert_eq!(record.summary(), "N/A, Unknown, Humidity: N/A%, Wind: N/A m/s");
    }
}
