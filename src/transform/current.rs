//! Current-conditions transformer.

use crate::nws::payload::ObservationPayload;
use crate::nws::validate::{validate, PayloadKind};
use crate::transform::units::{icon_for_description, to_celsius, to_hectopascals, to_meters_per_second};
use crate::types::records::CurrentWeatherRecord;
use chrono::{DateTime, Utc};
use log::warn;
use serde_json::Value;

/// Flatten a latest-observation payload into a [`CurrentWeatherRecord`].
///
/// Returns `None` when the payload is structurally unusable; the orchestrator
/// skips current conditions for the cycle in that case. Feels-like prefers
/// heat index, then wind chill, then the plain temperature.
pub fn transform_current(payload: &Value) -> Option<CurrentWeatherRecord> {
    if !validate(payload, PayloadKind::Current) {
        return None;
    }

    let observation: ObservationPayload = match serde_json::from_value(payload.clone()) {
        Ok(obs) => obs,
        Err(e) => {
            warn!("Failed to deserialize current observation: {e}");
            return None;
        }
    };
    let props = observation.properties;

    let temp = to_celsius(props.temperature.value, props.temperature.unit_or("wmoUnit:degC"));
    let feels_like = to_celsius(props.heat_index.value, props.heat_index.unit_or("wmoUnit:degC"))
        .or_else(|| to_celsius(props.wind_chill.value, props.wind_chill.unit_or("wmoUnit:degC")))
        .or(temp);

    let timestamp = props
        .timestamp
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|| {
            warn!("Observation timestamp missing or unparseable, using current time");
            Utc::now()
        });

    let description = props
        .text_description
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());
    let icon = icon_for_description(&description).to_string();

    Some(CurrentWeatherRecord {
        timestamp,
        temp,
        feels_like,
        humidity: props.relative_humidity.value.map(|h| h.round() as i64),
        pressure: to_hectopascals(
            props.barometric_pressure.value,
            props.barometric_pressure.unit_or("wmoUnit:Pa"),
        ),
        wind_speed: to_meters_per_second(
            props.wind_speed.value,
            props.wind_speed.unit_or("wmoUnit:m_s-1"),
        ),
        wind_deg: props.wind_direction.value.map(|d| d.round() as i64),
        description,
        icon,
    })
}
