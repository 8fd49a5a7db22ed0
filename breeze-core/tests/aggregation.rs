//! End-to-end aggregation: a real `OpenWeatherClient` against a mock
//! provider, driven through the `Dashboard`.

use std::sync::Arc;

use chrono::{Days, Utc};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use breeze_core::dashboard::{Dashboard, DataOrigin};
use breeze_core::provider::OpenWeatherClient;

fn weather_body() -> serde_json::Value {
    json!({
        "main": { "temp": 18.2, "feels_like": 17.4, "humidity": 61, "pressure": 1021 },
        "weather": [{ "description": "overcast clouds", "icon": "04d" }],
        "wind": { "speed": 5.1 },
        "visibility": 10000,
    })
}

fn forecast_body() -> serde_json::Value {
    // Two intervals per day for the three days after today.
    let today = Utc::now().date_naive();
    let list: Vec<_> = (1..=3)
        .flat_map(|offset| {
            let date = today.checked_add_days(Days::new(offset)).unwrap();
            [("09:00:00", 14.0), ("15:00:00", 21.0)].map(|(time, temp)| {
                json!({
                    "dt_txt": format!("{date} {time}"),
                    "main": { "temp": temp, "humidity": 70 },
                    "weather": [{ "description": "light rain", "icon": "10d" }],
                    "wind": { "speed": 4.0 },
                    "rain": { "3h": 0.3 },
                })
            })
        })
        .collect();

    json!({ "list": list })
}

fn air_body() -> serde_json::Value {
    json!({
        "list": [{
            "main": { "aqi": 3 },
            "components": {
                "pm2_5": 22.0, "pm10": 31.5, "co": 410.0,
                "no2": 18.7, "o3": 88.0, "so2": 6.2,
            },
        }],
    })
}

#[tokio::test]
async fn full_pass_publishes_weather_forecast_and_air_quality() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/air_pollution"))
        .respond_with(ResponseTemplate::new(200).set_body_json(air_body()))
        .mount(&server)
        .await;

    let feed = Arc::new(OpenWeatherClient::with_base_url(Some("KEY".into()), server.uri()));
    let dashboard = Dashboard::new(feed);

    dashboard.refresh(49.84, 24.03).await;
    let state = dashboard.state();

    assert_eq!(state.origin, Some(DataOrigin::Fetched));
    assert!(!state.is_loading);
    assert!(state.last_updated.is_some());

    let weather = state.weather.expect("weather present");
    assert_eq!(weather.temperature, 18.0);
    assert_eq!(weather.humidity, 61);

    assert_eq!(state.forecast.len(), 3);
    for day in &state.forecast {
        assert_eq!(day.temperature.min, 14.0);
        assert_eq!(day.temperature.max, 21.0);
        assert!((day.precipitation_mm - 0.6).abs() < 1e-9);
    }

    let air = state.air_quality.expect("air quality present");
    assert_eq!(air.aqi, 150);
}

#[tokio::test]
async fn air_quality_outage_substitutes_the_fallback_bundle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/air_pollution"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let feed = Arc::new(OpenWeatherClient::with_base_url(Some("KEY".into()), server.uri()));
    let dashboard = Dashboard::new(feed);

    dashboard.refresh(49.84, 24.03).await;
    let state = dashboard.state();

    // Not a partial merge: the fetched weather is discarded with the rest.
    assert_eq!(state.origin, Some(DataOrigin::Fallback));
    assert_eq!(state.weather.expect("fallback weather").temperature, 22.0);
    assert_eq!(state.air_quality.expect("fallback air quality").aqi, 75);
    assert_eq!(state.forecast.len(), 5);
    assert!(state.last_updated.is_some());
    assert!(!state.is_loading);
}
