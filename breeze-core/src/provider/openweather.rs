//! OpenWeatherMap-backed [`WeatherFeed`].
//!
//! Without an API key every operation synthesizes randomized demo data and
//! never touches the network. With a key, HTTP failures of any kind are
//! logged and collapse to `None`.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::demo;
use crate::model::{
    AirQualitySnapshot, FetchError, ForecastDay, TempRange, WeatherSnapshot,
};

use super::WeatherFeed;

const OPENWEATHER_URL: &str = "https://api.openweathermap.org/data/2.5";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const FORECAST_DAYS: usize = 5;

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: Option<String>,
    http: Client,
    base_url: String,
}

impl OpenWeatherClient {
    /// `api_key: None` puts the client in demo mode.
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, OPENWEATHER_URL)
    }

    /// Point the client at a different endpoint, e.g. a mock server.
    pub fn with_base_url(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self { api_key, http, base_url: base_url.into() }
    }

    pub fn is_demo(&self) -> bool {
        self.api_key.is_none()
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}/{endpoint}", self.base_url);

        let res = self.http.get(&url).query(query).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status { status, body: truncate_body(&body) });
        }

        serde_json::from_str(&body).map_err(|err| FetchError::Parse(err.to_string()))
    }

    fn coord_query(&self, key: &str, lat: f64, lon: f64, metric: bool) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("appid", key.to_string()),
        ];
        if metric {
            query.push(("units", "metric".to_string()));
        }
        query
    }

    async fn current_weather(
        &self,
        key: &str,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherSnapshot, FetchError> {
        let parsed: OwCurrentResponse = self
            .get_json("weather", &self.coord_query(key, lat, lon, true))
            .await?;

        let (description, icon) = representative_condition(&parsed.weather);

        Ok(WeatherSnapshot {
            temperature: parsed.main.temp.round(),
            feels_like: parsed.main.feels_like.round(),
            humidity: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
            // The current-weather endpoint carries no UV field.
            uv_index: 0.0,
            pressure: parsed.main.pressure,
            visibility_km: (parsed.visibility.unwrap_or(10_000.0) / 1000.0).round(),
            description,
            icon,
        })
    }

    async fn forecast(
        &self,
        key: &str,
        lat: f64,
        lon: f64,
    ) -> Result<Vec<ForecastDay>, FetchError> {
        let parsed: OwForecastResponse = self
            .get_json("forecast", &self.coord_query(key, lat, lon, true))
            .await?;

        Ok(group_forecast(&parsed.list, Utc::now().date_naive()))
    }

    async fn air_quality(
        &self,
        key: &str,
        lat: f64,
        lon: f64,
    ) -> Result<AirQualitySnapshot, FetchError> {
        let parsed: OwAirResponse = self
            .get_json("air_pollution", &self.coord_query(key, lat, lon, false))
            .await?;

        let entry = parsed.list.into_iter().next().ok_or_else(|| {
            FetchError::Parse("air pollution response contained no readings".into())
        })?;

        Ok(AirQualitySnapshot {
            // Provider scale is 1-5; ×50 approximates the 0-500 US scale.
            aqi: entry.main.aqi.saturating_mul(50),
            pm25: entry.components.pm2_5,
            pm10: entry.components.pm10,
            co: entry.components.co,
            no2: entry.components.no2,
            o3: entry.components.o3,
            so2: entry.components.so2,
        })
    }
}

#[async_trait]
impl WeatherFeed for OpenWeatherClient {
    async fn fetch_weather(&self, lat: f64, lon: f64) -> Option<WeatherSnapshot> {
        let Some(key) = self.api_key.as_deref() else {
            debug!("no API key configured, synthesizing demo weather");
            return Some(demo::weather());
        };

        match self.current_weather(key, lat, lon).await {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(%err, "current weather fetch failed");
                None
            }
        }
    }

    async fn fetch_forecast(&self, lat: f64, lon: f64) -> Option<Vec<ForecastDay>> {
        let Some(key) = self.api_key.as_deref() else {
            debug!("no API key configured, synthesizing demo forecast");
            return Some(demo::forecast(Utc::now().date_naive()));
        };

        match self.forecast(key, lat, lon).await {
            Ok(days) => Some(days),
            Err(err) => {
                warn!(%err, "forecast fetch failed");
                None
            }
        }
    }

    async fn fetch_air_quality(&self, lat: f64, lon: f64) -> Option<AirQualitySnapshot> {
        let Some(key) = self.api_key.as_deref() else {
            debug!("no API key configured, synthesizing demo air quality");
            return Some(demo::air_quality());
        };

        match self.air_quality(key, lat, lon).await {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(%err, "air quality fetch failed");
                None
            }
        }
    }
}

/// Collapse 3-hour interval readings into daily summaries.
///
/// Readings dated `today` or earlier are dropped; at most [`FORECAST_DAYS`]
/// days are kept, chronologically. Per day: min/max temperature, mean
/// humidity and wind speed, summed precipitation, and the first interval's
/// condition as representative.
fn group_forecast(entries: &[OwForecastEntry], today: NaiveDate) -> Vec<ForecastDay> {
    let mut days: BTreeMap<NaiveDate, DayAccum> = BTreeMap::new();

    for entry in entries {
        let Some(date) = entry
            .dt_txt
            .split_whitespace()
            .next()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        else {
            continue;
        };

        if date <= today {
            continue;
        }

        days.entry(date)
            .or_insert_with(|| {
                let (description, icon) = representative_condition(&entry.weather);
                DayAccum::new(description, icon)
            })
            .add(entry);
    }

    days.into_iter()
        .take(FORECAST_DAYS)
        .map(|(date, accum)| accum.finish(date))
        .collect()
}

struct DayAccum {
    temp_min: f64,
    temp_max: f64,
    humidity_sum: u32,
    wind_sum: f64,
    precipitation: f64,
    samples: u32,
    description: String,
    icon: String,
}

impl DayAccum {
    fn new(description: String, icon: String) -> Self {
        Self {
            temp_min: f64::INFINITY,
            temp_max: f64::NEG_INFINITY,
            humidity_sum: 0,
            wind_sum: 0.0,
            precipitation: 0.0,
            samples: 0,
            description,
            icon,
        }
    }

    fn add(&mut self, entry: &OwForecastEntry) {
        self.temp_min = self.temp_min.min(entry.main.temp);
        self.temp_max = self.temp_max.max(entry.main.temp);
        self.humidity_sum += u32::from(entry.main.humidity);
        self.wind_sum += entry.wind.speed;
        if let Some(rain) = &entry.rain {
            self.precipitation += rain.three_hour.unwrap_or(0.0);
        }
        self.samples += 1;
    }

    fn finish(self, date: NaiveDate) -> ForecastDay {
        let samples = f64::from(self.samples.max(1));

        ForecastDay {
            date,
            temperature: TempRange {
                min: self.temp_min.round(),
                max: self.temp_max.round(),
            },
            description: self.description,
            icon: self.icon,
            humidity: (f64::from(self.humidity_sum) / samples).round() as u8,
            wind_speed: round1(self.wind_sum / samples),
            precipitation_mm: round1(self.precipitation),
        }
    }
}

fn representative_condition(weather: &[OwWeather]) -> (String, String) {
    weather
        .first()
        .map(|w| (w.description.clone(), w.icon.clone()))
        .unwrap_or_else(|| ("Unknown".to_string(), "01d".to_string()))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        // Back off to a char boundary; byte 200 may sit inside a
        // multi-byte character.
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[derive(Debug, Deserialize)]
struct OwCurrentMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwCurrentMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    /// Meters; occasionally missing.
    visibility: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwRain {
    #[serde(rename = "3h")]
    three_hour: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwForecastMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    rain: Option<OwRain>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwAirMain {
    aqi: u16,
}

#[derive(Debug, Deserialize)]
struct OwAirComponents {
    pm2_5: f64,
    pm10: f64,
    co: f64,
    no2: f64,
    o3: f64,
    so2: f64,
}

#[derive(Debug, Deserialize)]
struct OwAirEntry {
    main: OwAirMain,
    components: OwAirComponents,
}

#[derive(Debug, Deserialize)]
struct OwAirResponse {
    list: Vec<OwAirEntry>,
}
