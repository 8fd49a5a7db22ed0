//! Randomized demo data, used by the weather/AQI client when no provider
//! credential is configured. Values are pseudo-random but range-plausible,
//! so the dashboard always has something to show.
//!
//! Not to be confused with the fixed fallback bundle in [`crate::dashboard`],
//! which substitutes deterministic data after a failed aggregation pass.

use chrono::{Days, NaiveDate};
use rand::Rng;

use crate::model::{AirQualitySnapshot, ForecastDay, TempRange, WeatherSnapshot};

const CURRENT_DESCRIPTIONS: [&str; 4] =
    ["Clear sky", "Few clouds", "Scattered clouds", "Partly cloudy"];

const FORECAST_DESCRIPTIONS: [&str; 5] =
    ["Clear sky", "Few clouds", "Scattered clouds", "Light rain", "Partly cloudy"];

const FORECAST_ICONS: [&str; 5] = ["01d", "02d", "03d", "10d", "04d"];

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn weather() -> WeatherSnapshot {
    let mut rng = rand::rng();

    WeatherSnapshot {
        temperature: rng.random_range(20.0..=35.0_f64).round(),
        feels_like: rng.random_range(18.0..=36.0_f64).round(),
        humidity: rng.random_range(40..=80),
        wind_speed: round1(rng.random_range(0.0..=20.0)),
        uv_index: f64::from(rng.random_range(0..=11_u8)),
        pressure: rng.random_range(1000..=1050),
        visibility_km: rng.random_range(5.0..=20.0_f64).round(),
        description: CURRENT_DESCRIPTIONS[rng.random_range(0..CURRENT_DESCRIPTIONS.len())].into(),
        icon: "01d".into(),
    }
}

/// Five days starting the day after `today`.
pub fn forecast(today: NaiveDate) -> Vec<ForecastDay> {
    let mut rng = rand::rng();

    (1..=5)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .map(|date| ForecastDay {
            date,
            temperature: TempRange {
                min: rng.random_range(15.0..=25.0_f64).round(),
                max: rng.random_range(25.0..=40.0_f64).round(),
            },
            description: FORECAST_DESCRIPTIONS[rng.random_range(0..FORECAST_DESCRIPTIONS.len())]
                .into(),
            icon: FORECAST_ICONS[rng.random_range(0..FORECAST_ICONS.len())].into(),
            humidity: rng.random_range(40..=80),
            wind_speed: round1(rng.random_range(0.0..=15.0)),
            precipitation_mm: if rng.random_bool(0.3) {
                round1(rng.random_range(0.0..=5.0))
            } else {
                0.0
            },
        })
        .collect()
}

pub fn air_quality() -> AirQualitySnapshot {
    let mut rng = rand::rng();

    AirQualitySnapshot {
        aqi: rng.random_range(10..=150),
        pm25: rng.random_range(0.0..=50.0_f64).round(),
        pm10: rng.random_range(0.0..=80.0_f64).round(),
        co: rng.random_range(0.0..=300.0_f64).round(),
        no2: rng.random_range(0.0..=100.0_f64).round(),
        o3: rng.random_range(0.0..=200.0_f64).round(),
        so2: rng.random_range(0.0..=50.0_f64).round(),
    }
}
