//! Low-level NWS API client.
//!
//! A thin wrapper over `reqwest` that attaches the identifying header set the
//! service requires, applies the per-request timeout, classifies failures
//! into the [`NwsApiError`] taxonomy, and retries transient ones through
//! [`with_retry`].

use crate::config::NwsConfig;
use crate::nws::error::NwsApiError;
use crate::nws::retry::{with_retry, RetryPolicy};
use crate::types::coordinate::Coordinate;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde_json::Value;

#[derive(Debug)]
pub struct NwsClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl NwsClient {
    /// Build a client from configuration. The User-Agent and Accept headers
    /// are attached to every request the client ever makes.
    pub fn new(config: &NwsConfig) -> Result<Self, NwsApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("nws-extract")),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(NwsApiError::ClientBuild)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: config.retry,
        })
    }

    /// The points metadata URL for a coordinate. The API canonicalizes
    /// coordinates to four decimal places.
    pub fn points_url(&self, coord: Coordinate) -> String {
        format!(
            "{}/points/{:.4},{:.4}",
            self.base_url, coord.latitude, coord.longitude
        )
    }

    /// The latest-observation URL for a station identifier.
    pub fn latest_observation_url(&self, station_id: &str) -> String {
        format!("{}/stations/{station_id}/observations/latest", self.base_url)
    }

    /// GET `url` and parse the body as JSON, retrying transient failures with
    /// exponential backoff.
    pub async fn request(&self, url: &str) -> Result<Value, NwsApiError> {
        with_retry(self.retry, || self.request_once(url)).await
    }

    async fn request_once(&self, url: &str) -> Result<Value, NwsApiError> {
        debug!("Requesting NWS API: {url}");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| classify_send_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(url, status, response).await);
        }

        let payload = response
            .json::<Value>()
            .await
            .map_err(|e| NwsApiError::MalformedJson {
                url: url.to_string(),
                source: e,
            })?;
        debug!("NWS API request successful: {url}");
        Ok(payload)
    }
}

/// Map a request-level `reqwest` failure onto the error taxonomy: timeouts
/// and connection failures are transient, anything else is a plain network
/// error.
fn classify_send_error(url: &str, error: reqwest::Error) -> NwsApiError {
    if error.is_timeout() {
        NwsApiError::Transient {
            url: url.to_string(),
            reason: "request timed out".to_string(),
        }
    } else if error.is_connect() {
        NwsApiError::Transient {
            url: url.to_string(),
            reason: "connection failed".to_string(),
        }
    } else {
        NwsApiError::Network {
            url: url.to_string(),
            source: error,
        }
    }
}

/// Map a non-success status onto the error taxonomy. 404 signals the service
/// has no data for the location; 500/503/429 are transient; everything else
/// is a generic API failure carrying the status and body.
async fn classify_status(
    url: &str,
    status: reqwest::StatusCode,
    response: reqwest::Response,
) -> NwsApiError {
    use reqwest::StatusCode;

    match status {
        StatusCode::NOT_FOUND => NwsApiError::NoCoverage {
            url: url.to_string(),
        },
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::INTERNAL_SERVER_ERROR => {
            NwsApiError::Transient {
                url: url.to_string(),
                reason: format!("status {status}"),
            }
        }
        StatusCode::TOO_MANY_REQUESTS => NwsApiError::Transient {
            url: url.to_string(),
            reason: "rate limit exceeded".to_string(),
        },
        _ => {
            let body = response.text().await.unwrap_or_default();
            NwsApiError::Api {
                url: url.to_string(),
                status,
                body,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NwsConfig;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> NwsConfig {
        NwsConfig {
            base_url: base_url.to_string(),
            retry: RetryPolicy::new(3, Duration::from_millis(1)),
            ..NwsConfig::default()
        }
    }

    #[test]
    fn url_construction() {
        let client = NwsClient::new(&test_config("https://api.weather.gov/")).unwrap();
        assert_eq!(
            client.points_url(Coordinate::new(42.3601, -71.0589)),
            "https://api.weather.gov/points/42.3601,-71.0589"
        );
        assert_eq!(
            client.latest_observation_url("KBOS"),
            "https://api.weather.gov/stations/KBOS/observations/latest"
        );
    }

    #[tokio::test]
    async fn request_sends_identifying_headers() {
        let server = MockServer::start().await;
        let config = test_config(&server.uri());
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header("accept", "application/json"))
            .and(header("user-agent", config.user_agent.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = NwsClient::new(&config).unwrap();
        let payload = client.request(&format!("{}/ping", server.uri())).await.unwrap();
        assert_eq!(payload["ok"], true);
    }

    #[tokio::test]
    async fn transient_status_is_retried_until_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"n": 3})))
            .expect(1)
            .mount(&server)
            .await;

        let client = NwsClient::new(&test_config(&server.uri())).unwrap();
        let payload = client.request(&format!("{}/flaky", server.uri())).await.unwrap();
        assert_eq!(payload["n"], 3);
    }

    #[tokio::test]
    async fn persistent_503_becomes_service_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let client = NwsClient::new(&test_config(&server.uri())).unwrap();
        let err = client
            .request(&format!("{}/down", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            NwsApiError::ServiceUnavailable { attempts: 3, .. }
        ));
    }

    #[tokio::test]
    async fn not_found_maps_to_geographic_error_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/points/10.0000,10.0000"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = NwsClient::new(&test_config(&server.uri())).unwrap();
        let err = client
            .request(&format!("{}/points/10.0000,10.0000", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, NwsApiError::NoCoverage { .. }));
    }

    #[tokio::test]
    async fn unexpected_status_maps_to_api_error_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forbidden"))
            .respond_with(ResponseTemplate::new(403).set_body_string("access denied"))
            .expect(1)
            .mount(&server)
            .await;

        let client = NwsClient::new(&test_config(&server.uri())).unwrap();
        let err = client
            .request(&format!("{}/forbidden", server.uri()))
            .await
            .unwrap_err();
        match err {
            NwsApiError::Api { status, body, .. } => {
                assert_eq!(status, reqwest::StatusCode::FORBIDDEN);
                assert_eq!(body, "access denied");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_body_maps_to_malformed_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/html"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html>not json</html>")
                    .insert_header("content-type", "text/html"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = NwsClient::new(&test_config(&server.uri())).unwrap();
        let err = client
            .request(&format!("{}/html", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, NwsApiError::MalformedJson { .. }));
    }
}
