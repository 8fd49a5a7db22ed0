//! Resolving the machine's own position.
//!
//! There is no portable positioning hardware to ask, so the capability is a
//! trait; the shipped implementation asks an IP-geolocation service for a
//! coarse position. Unlike the data clients, failures here propagate to the
//! caller so it can decide not to start a fetch at all.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::GeolocationConfig;
use crate::model::{Coordinates, GeolocationError};

const IP_API_URL: &str = "http://ip-api.com/json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// A previously resolved position younger than this is reused without a
/// network call.
const POSITION_MAX_AGE: Duration = Duration::from_secs(300);

#[async_trait]
pub trait Geolocator: Send + Sync + std::fmt::Debug {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// IP-lookup based [`Geolocator`].
#[derive(Debug)]
pub struct IpGeolocator {
    http: Client,
    base_url: String,
    enabled: bool,
    cache: Mutex<Option<CachedPosition>>,
}

#[derive(Debug, Clone, Copy)]
struct CachedPosition {
    coords: Coordinates,
    resolved_at: Instant,
}

impl IpGeolocator {
    pub fn new(config: &GeolocationConfig) -> Self {
        Self::with_base_url(config, IP_API_URL)
    }

    /// Point the locator at a different endpoint, e.g. a mock server.
    pub fn with_base_url(config: &GeolocationConfig, base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: base_url.into(),
            enabled: config.enabled,
            cache: Mutex::new(None),
        }
    }

    async fn lookup(&self) -> Result<Coordinates, GeolocationError> {
        let response = self
            .http
            .get(&self.base_url)
            .send()
            .await
            .map_err(request_error)?;

        let body: IpApiResponse = response
            .json()
            .await
            .map_err(|err| GeolocationError::Denied(err.to_string()))?;

        if body.status != "success" {
            let reason = body.message.unwrap_or_else(|| body.status.clone());
            return Err(GeolocationError::Denied(reason));
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinates { lat, lon }),
            _ => Err(GeolocationError::Denied(
                "lookup response carried no coordinates".into(),
            )),
        }
    }
}

fn request_error(err: reqwest::Error) -> GeolocationError {
    if err.is_timeout() {
        GeolocationError::Timeout
    } else {
        GeolocationError::Denied(err.to_string())
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        if !self.enabled {
            return Err(GeolocationError::Unavailable);
        }

        let mut cache = self.cache.lock().await;
        if let Some(cached) = *cache
            && cached.resolved_at.elapsed() < POSITION_MAX_AGE
        {
            debug!("reusing cached position");
            return Ok(cached.coords);
        }

        match self.lookup().await {
            Ok(coords) => {
                *cache = Some(CachedPosition { coords, resolved_at: Instant::now() });
                Ok(coords)
            }
            Err(err) => {
                warn!(%err, "geolocation lookup failed");
                Err(err)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn enabled() -> GeolocationConfig {
        GeolocationConfig { enabled: true }
    }

    #[tokio::test]
    async fn disabled_locator_is_unavailable_without_network_io() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let locator =
            IpGeolocator::with_base_url(&GeolocationConfig { enabled: false }, server.uri());

        let err = locator.current_position().await.unwrap_err();
        assert!(matches!(err, GeolocationError::Unavailable));
    }

    #[tokio::test]
    async fn successful_lookup_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "lat": 49.84,
                "lon": 24.03,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let locator = IpGeolocator::with_base_url(&enabled(), server.uri());

        let first = locator.current_position().await.expect("lookup must succeed");
        let second = locator.current_position().await.expect("cache must hit");
        assert_eq!(first, second);
        assert!((first.lat - 49.84).abs() < 1e-9);
    }

    #[tokio::test]
    async fn service_refusal_maps_to_denied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "fail",
                "message": "private range",
            })))
            .mount(&server)
            .await;

        let locator = IpGeolocator::with_base_url(&enabled(), server.uri());

        let err = locator.current_position().await.unwrap_err();
        assert!(matches!(err, GeolocationError::Denied(reason) if reason == "private range"));
    }
}
