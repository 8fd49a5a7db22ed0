//! Forward geocoding: free-text place search via Nominatim (OpenStreetMap).
//!
//! The client never fails: an empty query, a transport error or an
//! unexpected response all yield an empty candidate list, so callers treat
//! "no results" and "search failed" identically.

use reqwest::Client;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::warn;

use crate::model::GeocodeCandidate;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
// Nominatim usage policy requires an identifying User-Agent.
const USER_AGENT: &str = concat!("breeze/", env!("CARGO_PKG_VERSION"));
const RESULT_LIMIT: u32 = 5;

#[derive(Debug, Clone)]
pub struct GeocodeClient {
    http: Client,
    base_url: String,
}

impl Default for GeocodeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GeocodeClient {
    pub fn new() -> Self {
        Self::with_base_url(NOMINATIM_URL)
    }

    /// Point the client at a different endpoint, e.g. a mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self { http, base_url: base_url.into() }
    }

    /// Search for places matching `query`.
    ///
    /// Whitespace-only queries short-circuit to an empty list without a
    /// network call. Results are deduplicated by label, first occurrence
    /// wins, so the list never shows two identical entries.
    pub async fn search(&self, query: &str) -> Vec<GeocodeCandidate> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let places = match self.fetch_places(query).await {
            Ok(places) => places,
            Err(err) => {
                warn!(%err, query, "place search failed");
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        places
            .into_iter()
            .map(candidate_from_place)
            .filter(|candidate| seen.insert(candidate.label.clone()))
            .collect()
    }

    async fn fetch_places(&self, query: &str) -> Result<Vec<NominatimPlace>, reqwest::Error> {
        let url = format!("{}/search", self.base_url);
        let limit = RESULT_LIMIT.to_string();

        self.http
            .get(&url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("addressdetails", "1"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

fn candidate_from_place(place: NominatimPlace) -> GeocodeCandidate {
    let address = place.address.unwrap_or_default();
    let city = address.city.or(address.town).or(address.village);

    let label: String = [city, address.state, address.country]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    GeocodeCandidate {
        label: if label.is_empty() { place.display_name.clone() } else { label },
        value: place.display_name,
        lat: place.lat,
        lon: place.lon,
        place_id: place.place_id,
        kind: place.kind,
        class: place.class,
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    place_id: u64,
    display_name: String,
    lat: String,
    lon: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    class: String,
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize, Default)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn place(place_id: u64, city: &str, country: &str) -> serde_json::Value {
        json!({
            "place_id": place_id,
            "display_name": format!("{city}, some district, {country}"),
            "lat": "49.84",
            "lon": "24.03",
            "type": "city",
            "class": "place",
            "address": { "city": city, "country": country },
        })
    }

    #[tokio::test]
    async fn blank_queries_make_no_network_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let client = GeocodeClient::with_base_url(server.uri());
        assert!(client.search("").await.is_empty());
        assert!(client.search("   ").await.is_empty());
    }

    #[tokio::test]
    async fn duplicate_labels_keep_the_first_arrival() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "lviv"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                place(101, "Lviv", "Ukraine"),
                place(202, "Lviv", "Ukraine"),
                place(303, "Lutsk", "Ukraine"),
            ])))
            .mount(&server)
            .await;

        let client = GeocodeClient::with_base_url(server.uri());
        let results = client.search("lviv").await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].label, "Lviv, Ukraine");
        assert_eq!(results[0].place_id, 101);
        assert_eq!(results[1].label, "Lutsk, Ukraine");
    }

    #[tokio::test]
    async fn label_falls_back_to_display_name_without_address_parts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "place_id": 7,
                "display_name": "Somewhere remote",
                "lat": "1.0",
                "lon": "2.0",
            }])))
            .mount(&server)
            .await;

        let client = GeocodeClient::with_base_url(server.uri());
        let results = client.search("somewhere").await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].label, "Somewhere remote");
    }

    #[tokio::test]
    async fn server_errors_degrade_to_an_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = GeocodeClient::with_base_url(server.uri());
        assert!(client.search("lviv").await.is_empty());
    }
}
