//! Structural validation of raw NWS payloads.
//!
//! The API is loosely structured, so before any typed deserialization each
//! payload is checked for the fields its kind requires. Any mismatch fails
//! closed: the functions here return `false`, log the offending kind, and
//! never panic.

use log::warn;
use serde_json::Value;

/// The four payload shapes the pipeline consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Points,
    Current,
    Hourly,
    Daily,
}

impl std::fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PayloadKind::Points => "points",
            PayloadKind::Current => "current",
            PayloadKind::Hourly => "hourly",
            PayloadKind::Daily => "daily",
        };
        f.write_str(name)
    }
}

/// Check that `payload` carries the fields required for its declared kind.
///
/// - `points`: `properties` object with `forecast` and `forecastHourly`.
/// - `current`: `properties` object with a `temperature` field (presence
///   only, not value validity).
/// - `hourly`/`daily`: `properties.periods` present and an array.
pub fn validate(payload: &Value, kind: PayloadKind) -> bool {
    let Some(properties) = payload.get("properties").and_then(Value::as_object) else {
        warn!("NWS {kind} payload missing 'properties' object");
        return false;
    };

    let ok = match kind {
        PayloadKind::Points => {
            ["forecast", "forecastHourly"]
                .iter()
                .all(|field| match properties.get(*field) {
                    Some(_) => true,
                    None => {
                        warn!("NWS points payload missing required field '{field}'");
                        false
                    }
                })
        }
        PayloadKind::Current => {
            if properties.contains_key("temperature") {
                true
            } else {
                warn!("NWS current payload missing 'temperature'");
                false
            }
        }
        PayloadKind::Hourly | PayloadKind::Daily => match properties.get("periods") {
            Some(Value::Array(_)) => true,
            Some(_) => {
                warn!("NWS {kind} payload 'periods' is not an array");
                false
            }
            None => {
                warn!("NWS {kind} payload missing 'periods'");
                false
            }
        },
    };

    ok
}
