//! Unit conversion helpers for the loosely-typed quantities the NWS API
//! reports.
//!
//! Every function takes an optional value plus the WMO unit code attached to
//! it and produces the canonical storage unit (Celsius, hectopascals, meters
//! per second). Conversion never fails: `None` in yields `None` out, and an
//! unrecognized unit code falls back to the documented assumption with a
//! warning rather than an error.

use log::warn;

/// Convert a temperature to degrees Celsius.
///
/// Unrecognized unit codes are assumed to already be Celsius.
pub fn to_celsius(value: Option<f64>, unit_code: &str) -> Option<f64> {
    let v = value?;
    match unit_code {
        "wmoUnit:degC" => Some(v),
        "wmoUnit:degF" => Some((v - 32.0) * 5.0 / 9.0),
        "wmoUnit:K" => Some(v - 273.15),
        other => {
            warn!("Unknown temperature unit '{other}', assuming Celsius");
            Some(v)
        }
    }
}

/// Convert a pressure to hectopascals, truncated toward zero.
///
/// Unrecognized unit codes are assumed to be Pascals.
pub fn to_hectopascals(value: Option<f64>, unit_code: &str) -> Option<i64> {
    let v = value?;
    match unit_code {
        "wmoUnit:Pa" => Some((v / 100.0) as i64),
        "wmoUnit:hPa" => Some(v as i64),
        other => {
            warn!("Unknown pressure unit '{other}', assuming Pascals");
            Some((v / 100.0) as i64)
        }
    }
}

/// Convert a wind speed to meters per second.
///
/// Unrecognized unit codes are assumed to already be m/s.
pub fn to_meters_per_second(value: Option<f64>, unit_code: &str) -> Option<f64> {
    let v = value?;
    match unit_code {
        "wmoUnit:m_s-1" => Some(v),
        "wmoUnit:km_h-1" => Some(v / 3.6),
        "wmoUnit:mi_h-1" => Some(v * 0.44704),
        other => {
            warn!("Unknown wind speed unit '{other}', assuming m/s");
            Some(v)
        }
    }
}

/// 16-point compass rose, in order, with degrees rounded the way the upstream
/// schema expects them (22.5° steps truncated to whole degrees).
const COMPASS_DEGREES: [(&str, i64); 16] = [
    ("N", 0),
    ("NNE", 22),
    ("NE", 45),
    ("ENE", 67),
    ("E", 90),
    ("ESE", 112),
    ("SE", 135),
    ("SSE", 157),
    ("S", 180),
    ("SSW", 202),
    ("SW", 225),
    ("WSW", 247),
    ("W", 270),
    ("WNW", 292),
    ("NW", 315),
    ("NNW", 337),
];

/// Map a 16-point compass code to degrees. Unknown codes map to 0 (north).
pub fn compass_to_degrees(direction: &str) -> i64 {
    COMPASS_DEGREES
        .iter()
        .find(|(code, _)| *code == direction)
        .map(|(_, deg)| *deg)
        .unwrap_or(0)
}

/// Pull the first number out of a free-text magnitude string like "10 mph" or
/// "5 to 10 mph". Returns `None` when the text contains no number.
pub fn first_number(text: &str) -> Option<f64> {
    text.split(|c: char| !c.is_ascii_digit() && c != '.')
        .find(|token| !token.is_empty())
        .and_then(|token| token.parse::<f64>().ok())
}

/// Parse a forecast-period wind speed string (mph) into meters per second.
pub fn wind_speed_from_text(text: &str) -> Option<f64> {
    first_number(text).map(|mph| mph * 0.44704)
}

/// Ordered keyword table mapping forecast text to icon codes. First match
/// wins, so the more specific phrases must come before the generic ones
/// ("light rain" before "rain").
const ICON_KEYWORDS: [(&[&str], &str); 9] = [
    (&["clear", "sunny"], "01d"),
    (&["few clouds", "partly cloudy"], "02d"),
    (&["scattered clouds"], "03d"),
    (&["broken clouds", "overcast"], "04d"),
    (&["shower", "light rain"], "09d"),
    (&["rain"], "10d"),
    (&["thunderstorm"], "11d"),
    (&["snow"], "13d"),
    (&["mist", "fog"], "50d"),
];

/// Derive an icon code from a weather description by case-insensitive
/// keyword match. Unknown or empty descriptions default to clear sky.
pub fn icon_for_description(description: &str) -> &'static str {
    let lower = description.to_lowercase();
    for (keywords, icon) in ICON_KEYWORDS {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return icon;
        }
    }
    "01d"
}
