//! Remote geocoding client.
//!
//! One HTTPS GET per unresolved coordinate against the reverse-geocoding
//! endpoint, with exponential-backoff retries for transport failures. Empty
//! and unparsable bodies are reported as errors; an empty result list parses
//! fine and is left to the resolver's validity check.

use std::sync::Arc;

use tokio_retry::Retry;

use crate::config::{GEOCODE_URL_BASE, RETRY_MAX_ATTEMPTS};
use crate::error_handling::{get_retry_strategy, ClientError};

use super::types::{Coordinate, GeocodeResponse};

/// HTTP client for the remote geocoding service.
///
/// Holds a shared `reqwest::Client`; cheap to clone per task. The base URL
/// is overridable so tests can point it at a local mock server.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    http: Arc<reqwest::Client>,
    api_key: String,
    base_url: String,
}

impl GeocodeClient {
    /// Creates a client against the production geocoding endpoint.
    pub fn new(http: Arc<reqwest::Client>, api_key: impl Into<String>) -> Self {
        Self::with_base_url(http, api_key, GEOCODE_URL_BASE)
    }

    /// Creates a client against an alternate endpoint (tests, proxies).
    pub fn with_base_url(
        http: Arc<reqwest::Client>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        GeocodeClient {
            http,
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Fetches the geocode response for a coordinate.
    ///
    /// Transport errors are retried with the standard backoff strategy;
    /// whatever error remains after the final attempt is returned. The body
    /// is read as text first so a blank body can be distinguished from a
    /// malformed one.
    pub async fn fetch(&self, coord: Coordinate) -> Result<GeocodeResponse, ClientError> {
        let url = format!(
            "{}?latlng={},{}&key={}",
            self.base_url, coord.lat, coord.lon, self.api_key
        );

        let strategy = get_retry_strategy().take(RETRY_MAX_ATTEMPTS);
        let body = Retry::spawn(strategy, || async {
            let response = self.http.get(&url).send().await?;
            let response = response.error_for_status()?;
            response.text().await
        })
        .await?;

        if body.trim().is_empty() {
            return Err(ClientError::EmptyBody);
        }

        let response: GeocodeResponse = serde_json::from_str(&body)?;
        log::debug!(
            "fetched geocode response for {} ({} results)",
            coord,
            response.results.len()
        );
        Ok(response)
    }
}
