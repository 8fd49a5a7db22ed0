//! Text rendering of the dashboard state.

use std::fmt::Write;

use breeze_core::{
    AirQualitySnapshot, AqiBand, DashboardState, DataOrigin, Location, Pollutant, PollutantBand,
    UvBand, WeatherSnapshot,
};

/// Render one full dashboard frame.
pub fn dashboard(location: &Location, state: &DashboardState, demo: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== {} ===", location.label);

    if demo {
        let _ = writeln!(out, "Demo data: no API key configured (run `breeze configure`).");
    }
    if state.origin == Some(DataOrigin::Fallback) {
        let _ = writeln!(out, "Live data unavailable; showing fallback values.");
    }

    if let Some(weather) = &state.weather {
        current_conditions(&mut out, weather);
    } else {
        let _ = writeln!(out, "\nNo weather data yet.");
    }

    if !state.forecast.is_empty() {
        let _ = writeln!(out, "\n5-day forecast:");
        for day in &state.forecast {
            let rain = if day.precipitation_mm > 0.0 {
                format!(", {} mm rain", day.precipitation_mm)
            } else {
                String::new()
            };
            let _ = writeln!(
                out,
                "  {}  {:>3.0}..{:<3.0} °C  {} ({}% humidity, {} m/s{rain})",
                day.date,
                day.temperature.min,
                day.temperature.max,
                day.description,
                day.humidity,
                day.wind_speed,
            );
        }
    }

    if let Some(air) = &state.air_quality {
        air_quality(&mut out, air);
    }

    if let Some(updated) = state.last_updated {
        let _ = writeln!(out, "\nLast updated: {}", updated.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    out
}

fn current_conditions(out: &mut String, weather: &WeatherSnapshot) {
    let uv_band = UvBand::classify(weather.uv_index);

    let _ = writeln!(
        out,
        "\n{} °C, {} (feels like {} °C)",
        weather.temperature, weather.description, weather.feels_like,
    );
    let _ = writeln!(
        out,
        "Humidity {}%  Wind {} m/s  Pressure {} hPa  Visibility {} km",
        weather.humidity, weather.wind_speed, weather.pressure, weather.visibility_km,
    );
    let _ = writeln!(out, "UV index {} ({})", weather.uv_index, uv_band.label());
}

fn air_quality(out: &mut String, air: &AirQualitySnapshot) {
    let band = AqiBand::classify(air.aqi);

    let _ = writeln!(out, "\nAir quality index: {} ({})", air.aqi, band.label());
    let _ = writeln!(out, "{}", band.health_tip());
    let _ = writeln!(out, "{}", band.recommendation());

    let _ = writeln!(out, "Pollutants (µg/m³):");
    let banded = [
        (Pollutant::Pm25, air.pm25),
        (Pollutant::Pm10, air.pm10),
        (Pollutant::O3, air.o3),
        (Pollutant::No2, air.no2),
    ];
    for (pollutant, value) in banded {
        let band = PollutantBand::classify(pollutant, value);
        let _ = writeln!(out, "  {:<6} {:>7.1}  {}", pollutant.label(), value, band.label());
    }
    let _ = writeln!(out, "  {:<6} {:>7.1}", "CO", air.co);
    let _ = writeln!(out, "  {:<6} {:>7.1}", "SO₂", air.so2);
}

#[cfg(test)]
mod tests {
    use super::*;
    use breeze_core::{ForecastDay, TempRange};
    use chrono::NaiveDate;

    fn location() -> Location {
        Location { label: "Lviv, Ukraine".into(), lat: "49.84".into(), lon: "24.03".into() }
    }

    fn populated_state(origin: DataOrigin) -> DashboardState {
        DashboardState {
            weather: Some(WeatherSnapshot {
                temperature: 22.0,
                feels_like: 24.0,
                humidity: 65,
                wind_speed: 3.2,
                uv_index: 6.0,
                pressure: 1013,
                visibility_km: 10.0,
                description: "partly cloudy".into(),
                icon: "02d".into(),
            }),
            forecast: vec![ForecastDay {
                date: NaiveDate::from_ymd_opt(2024, 6, 11).unwrap(),
                temperature: TempRange { min: 19.0, max: 29.0 },
                description: "sunny".into(),
                icon: "01d".into(),
                humidity: 62,
                wind_speed: 3.0,
                precipitation_mm: 0.0,
            }],
            air_quality: Some(AirQualitySnapshot {
                aqi: 120,
                pm25: 40.0,
                pm10: 18.0,
                co: 210.0,
                no2: 25.0,
                o3: 95.0,
                so2: 4.0,
            }),
            is_loading: false,
            last_updated: None,
            origin: Some(origin),
        }
    }

    #[test]
    fn renders_bands_for_uv_aqi_and_pollutants() {
        let text = dashboard(&location(), &populated_state(DataOrigin::Fetched), false);

        assert!(text.contains("UV index 6 (High)"));
        assert!(text.contains("120 (Unhealthy for Sensitive Groups)"));
        // pm25 at 40.0 sits in the Unhealthy band of its scale.
        let pm25_line = text
            .lines()
            .find(|line| line.contains("PM2.5"))
            .expect("pm25 line present");
        assert!(pm25_line.contains("40.0"));
        assert!(pm25_line.ends_with("Unhealthy"));
        assert!(!text.contains("fallback"));
    }

    #[test]
    fn fallback_and_demo_notices_are_rendered() {
        let text = dashboard(&location(), &populated_state(DataOrigin::Fallback), true);

        assert!(text.contains("Demo data"));
        assert!(text.contains("fallback values"));
    }

    #[test]
    fn empty_state_still_renders() {
        let text = dashboard(&location(), &DashboardState::default(), false);

        assert!(text.contains("Lviv, Ukraine"));
        assert!(text.contains("No weather data yet."));
    }
}
