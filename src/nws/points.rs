//! Coordinate-to-endpoint routing via the points metadata lookup.

use crate::nws::cache::PointsCache;
use crate::nws::client::NwsClient;
use crate::nws::error::NwsApiError;
use crate::nws::payload::PointsPayload;
use crate::nws::validate::{validate, PayloadKind};
use crate::types::coordinate::Coordinate;
use log::info;
use serde_json::Value;

/// The per-coordinate endpoint URLs extracted from a points payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingUrls {
    pub forecast: String,
    pub forecast_hourly: String,
    pub observation_stations: String,
}

/// Resolve the routing URLs for `coord`, consulting the cache first.
///
/// Coordinates outside known service coverage are rejected before any
/// network call. A fresh payload is validated before it is cached, so an
/// invalid response never poisons the cache.
pub async fn resolve_routing(
    client: &NwsClient,
    cache: &mut PointsCache,
    coord: Coordinate,
) -> Result<RoutingUrls, NwsApiError> {
    if !coord.within_nws_coverage() {
        return Err(NwsApiError::OutsideCoverage {
            lat: coord.latitude,
            lon: coord.longitude,
        });
    }

    if let Some(cached) = cache.get(coord) {
        return extract_routing_urls(&cached);
    }

    let url = client.points_url(coord);
    let payload = client.request(&url).await?;
    if !validate(&payload, PayloadKind::Points) {
        return Err(NwsApiError::InvalidPayload {
            kind: PayloadKind::Points,
            url,
        });
    }

    let urls = extract_routing_urls(&payload)?;
    cache.put(coord, payload);
    info!("Resolved NWS routing for {coord}");
    Ok(urls)
}

fn extract_routing_urls(payload: &Value) -> Result<RoutingUrls, NwsApiError> {
    let points: PointsPayload = serde_json::from_value(payload.clone())
        .map_err(|_| NwsApiError::MissingMetadataField { field: "properties" })?;
    let props = points.properties;

    let require = |value: Option<String>, field: &'static str| {
        value.ok_or(NwsApiError::MissingMetadataField { field })
    };

    Ok(RoutingUrls {
        forecast: require(props.forecast, "forecast")?,
        forecast_hourly: require(props.forecast_hourly, "forecastHourly")?,
        observation_stations: require(props.observation_stations, "observationStations")?,
    })
}
