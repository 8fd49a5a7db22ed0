use async_trait::async_trait;
use std::fmt::Debug;

use crate::model::{AirQualitySnapshot, ForecastDay, WeatherSnapshot};

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Source of weather, forecast and air-quality data for a coordinate pair.
///
/// The three operations are independent and never fail: a fetch that cannot
/// be completed yields `None` (logged at the implementation), and an
/// implementation without a credential substitutes randomized demo data
/// instead of touching the network.
#[async_trait]
pub trait WeatherFeed: Send + Sync + Debug {
    async fn fetch_weather(&self, lat: f64, lon: f64) -> Option<WeatherSnapshot>;

    /// Aggregated daily forecast, at most five days starting tomorrow.
    async fn fetch_forecast(&self, lat: f64, lon: f64) -> Option<Vec<ForecastDay>>;

    async fn fetch_air_quality(&self, lat: f64, lon: f64) -> Option<AirQualitySnapshot>;
}
