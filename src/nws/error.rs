use crate::nws::validate::PayloadKind;
use thiserror::Error;

/// Failure taxonomy for the NWS API. The retry policy dispatches purely on
/// the variant: [`NwsApiError::Transient`] is retried with backoff, every
/// other variant is terminal and returned to the caller immediately.
#[derive(Debug, Error)]
pub enum NwsApiError {
    /// Pre-flight coverage check failed; no network call was made.
    #[error("coordinates ({lat}, {lon}) are outside the NWS coverage area")]
    OutsideCoverage { lat: f64, lon: f64 },

    /// The service answered 404: it has no data for this location.
    #[error("location outside NWS coverage area for {url}")]
    NoCoverage { url: String },

    /// Upstream overloaded, rate-limited, or unreachable. Retried with
    /// exponential backoff; converted to [`NwsApiError::ServiceUnavailable`]
    /// once attempts are exhausted.
    #[error("transient NWS failure for {url}: {reason}")]
    Transient { url: String, reason: String },

    /// A transient failure that survived every retry attempt.
    #[error("NWS API unavailable for {url} after {attempts} attempts")]
    ServiceUnavailable { url: String, attempts: u32 },

    /// Any other non-success status. Carries the status and body for
    /// diagnosis; never retried.
    #[error("NWS API error for {url} with status {status}")]
    Api {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body was not parseable as JSON; never retried.
    #[error("malformed JSON response from {url}")]
    MalformedJson {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A request-level failure that is not a timeout or connection problem.
    #[error("network request failed for {url}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A payload passed the HTTP layer but failed structural validation.
    #[error("invalid {kind} payload from {url}")]
    InvalidPayload { kind: PayloadKind, url: String },

    /// The points metadata is missing one of the routing URLs.
    #[error("missing field '{field}' in NWS points metadata")]
    MissingMetadataField { field: &'static str },

    /// The HTTP client itself could not be constructed.
    #[error("failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),
}

impl NwsApiError {
    /// True for failures the backoff loop should retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, NwsApiError::Transient { .. })
    }
}
