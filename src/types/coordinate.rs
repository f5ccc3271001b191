//! Geographical coordinate type used as the cache key and the input to
//! pre-flight coverage validation.

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair, immutable once read from configuration.
///
/// # Examples
///
/// ```
/// use nws_extract::Coordinate;
///
/// let boston = Coordinate::new(42.3601, -71.0589);
/// assert!(boston.within_nws_coverage());
///
/// let berlin = Coordinate::new(52.5200, 13.4050);
/// assert!(!berlin.within_nws_coverage());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees (positive for North, negative for South).
    pub latitude: f64,
    /// Longitude in decimal degrees (positive for East, negative for West).
    pub longitude: f64,
}

/// Bounding boxes of the NWS coverage area: (lat_min, lat_max, lon_min, lon_max).
///
/// Continental US, Alaska, Hawaii, Puerto Rico and nearby territories. These
/// are deliberately coarse; the API remains the authority for edge locations
/// and answers 404 for points it cannot serve.
const COVERAGE_BOXES: [(f64, f64, f64, f64); 4] = [
    (24.5, 49.4, -125.0, -66.9),  // continental US
    (51.2, 71.4, -179.1, -129.9), // Alaska
    (18.9, 28.4, -178.3, -154.8), // Hawaii
    (17.8, 18.6, -67.3, -65.2),   // Puerto Rico / territories
];

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns true when the coordinate falls inside one of the NWS coverage
    /// bounding boxes. Resolution fails fast on this check before any network
    /// call is made.
    pub fn within_nws_coverage(&self) -> bool {
        COVERAGE_BOXES
            .iter()
            .any(|(lat_min, lat_max, lon_min, lon_max)| {
                (*lat_min..=*lat_max).contains(&self.latitude)
                    && (*lon_min..=*lon_max).contains(&self.longitude)
            })
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}
