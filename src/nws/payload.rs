//! Typed views over the NWS JSON payloads.
//!
//! Raw responses travel as `serde_json::Value` until they pass structural
//! validation; the transformers then deserialize into these structs. Every
//! field the API is known to omit is optional, so deserialization tolerates
//! sparse payloads and the transformers decide how to handle gaps.

use serde::Deserialize;

/// A measurement plus the WMO unit code it was reported in, e.g.
/// `{"value": 4.4, "unitCode": "wmoUnit:degC"}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuantitativeValue {
    pub value: Option<f64>,
    #[serde(rename = "unitCode")]
    pub unit_code: Option<String>,
}

impl QuantitativeValue {
    /// The unit code, or `fallback` when the API omitted it.
    pub fn unit_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.unit_code.as_deref().unwrap_or(fallback)
    }
}

/// `/points/{lat},{lon}` metadata: routing URLs for a coordinate.
#[derive(Debug, Clone, Deserialize)]
pub struct PointsPayload {
    pub properties: PointsProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointsProperties {
    pub forecast: Option<String>,
    #[serde(rename = "forecastHourly")]
    pub forecast_hourly: Option<String>,
    #[serde(rename = "observationStations")]
    pub observation_stations: Option<String>,
}

/// Station list returned by the observation-stations URL.
#[derive(Debug, Clone, Deserialize)]
pub struct StationsPayload {
    #[serde(default)]
    pub features: Vec<StationFeature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationFeature {
    #[serde(default)]
    pub properties: StationProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationProperties {
    #[serde(rename = "stationIdentifier")]
    pub station_identifier: Option<String>,
}

/// Latest observation for a station.
#[derive(Debug, Clone, Deserialize)]
pub struct ObservationPayload {
    pub properties: ObservationProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ObservationProperties {
    pub timestamp: Option<String>,
    pub temperature: QuantitativeValue,
    #[serde(rename = "heatIndex")]
    pub heat_index: QuantitativeValue,
    #[serde(rename = "windChill")]
    pub wind_chill: QuantitativeValue,
    #[serde(rename = "relativeHumidity")]
    pub relative_humidity: QuantitativeValue,
    #[serde(rename = "barometricPressure")]
    pub barometric_pressure: QuantitativeValue,
    #[serde(rename = "windSpeed")]
    pub wind_speed: QuantitativeValue,
    #[serde(rename = "windDirection")]
    pub wind_direction: QuantitativeValue,
    #[serde(rename = "textDescription")]
    pub text_description: Option<String>,
}

/// Hourly or daily forecast: a list of periods.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastPayload {
    pub properties: ForecastProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastProperties {
    #[serde(default)]
    pub periods: Vec<ForecastPeriod>,
}

/// One discrete forecast interval: an hour, or a day/night half-day.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ForecastPeriod {
    #[serde(rename = "startTime")]
    pub start_time: Option<String>,
    pub temperature: Option<f64>,
    #[serde(rename = "temperatureUnit")]
    pub temperature_unit: Option<String>,
    /// Free text, e.g. "10 mph" or "5 to 10 mph".
    #[serde(rename = "windSpeed")]
    pub wind_speed: Option<String>,
    /// 16-point compass code, e.g. "NW".
    #[serde(rename = "windDirection")]
    pub wind_direction: Option<String>,
    #[serde(rename = "shortForecast")]
    pub short_forecast: Option<String>,
    #[serde(rename = "probabilityOfPrecipitation")]
    pub probability_of_precipitation: Option<QuantitativeValue>,
    #[serde(rename = "relativeHumidity")]
    pub relative_humidity: Option<QuantitativeValue>,
    #[serde(rename = "isDaytime")]
    pub is_daytime: Option<bool>,
}

impl ForecastPeriod {
    /// Probability of precipitation as a 0.0-1.0 fraction; 0 when absent.
    pub fn pop_fraction(&self) -> f64 {
        self.probability_of_precipitation
            .as_ref()
            .and_then(|qv| qv.value)
            .map(|pct| pct / 100.0)
            .unwrap_or(0.0)
    }

    /// Period temperature converted to Celsius. The forecast endpoints report
    /// Fahrenheit by default; only an explicit non-"F" unit is taken as
    /// already-Celsius.
    pub fn temperature_celsius(&self) -> Option<f64> {
        let temp = self.temperature?;
        match self.temperature_unit.as_deref() {
            Some("F") | None => Some((temp - 32.0) * 5.0 / 9.0),
            Some(_) => Some(temp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn observation_tolerates_sparse_properties() {
        let payload: ObservationPayload = serde_json::from_value(json!({
            "properties": { "temperature": { "value": 4.4, "unitCode": "wmoUnit:degC" } }
        }))
        .unwrap();
        assert_eq!(payload.properties.temperature.value, Some(4.4));
        assert!(payload.properties.heat_index.value.is_none());
        assert!(payload.properties.timestamp.is_none());
    }

    #[test]
    fn period_pop_defaults_to_zero() {
        let period = ForecastPeriod::default();
        assert_eq!(period.pop_fraction(), 0.0);

        let period: ForecastPeriod = serde_json::from_value(json!({
            "probabilityOfPrecipitation": { "value": null }
        }))
        .unwrap();
        assert_eq!(period.pop_fraction(), 0.0);

        let period: ForecastPeriod = serde_json::from_value(json!({
            "probabilityOfPrecipitation": { "value": 20 }
        }))
        .unwrap();
        assert!((period.pop_fraction() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn period_temperature_defaults_to_fahrenheit() {
        let period: ForecastPeriod =
            serde_json::from_value(json!({ "temperature": 41 })).unwrap();
        assert!((period.temperature_celsius().unwrap() - 5.0).abs() < 0.1);

        let period: ForecastPeriod = serde_json::from_value(
            json!({ "temperature": 5.0, "temperatureUnit": "C" }),
        )
        .unwrap();
        assert_eq!(period.temperature_celsius(), Some(5.0));
    }
}
