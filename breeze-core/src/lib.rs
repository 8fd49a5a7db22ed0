//! Core library for the `breeze` dashboard.
//!
//! This crate defines:
//! - Configuration & credential handling
//! - Clients for the geocoding, geolocation and weather/AQI providers
//! - The aggregation service that merges fetches into one view state
//! - Severity banding for AQI, pollutant and UV values
//!
//! It is used by `breeze-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod dashboard;
pub mod demo;
pub mod geocode;
pub mod geolocate;
pub mod location;
pub mod model;
pub mod provider;
pub mod severity;

pub use config::Config;
pub use dashboard::{Dashboard, DashboardState, DataOrigin, REFRESH_PERIOD};
pub use geocode::GeocodeClient;
pub use geolocate::{Geolocator, IpGeolocator};
pub use location::LocationState;
pub use model::{
    AirQualitySnapshot, Coordinates, FetchError, ForecastDay, GeocodeCandidate,
    GeolocationError, Location, TempRange, WeatherSnapshot,
};
pub use provider::{OpenWeatherClient, WeatherFeed};
pub use severity::{AqiBand, Pollutant, PollutantBand, UvBand};
