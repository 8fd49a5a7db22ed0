use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The currently selected place. Coordinates are kept as strings, exactly
/// as the geocoder returned them; `coords` parses them on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub label: String,
    pub lat: String,
    pub lon: String,
}

impl Location {
    pub fn coords(&self) -> Option<Coordinates> {
        let lat = self.lat.trim().parse().ok()?;
        let lon = self.lon.trim().parse().ok()?;
        Some(Coordinates { lat, lon })
    }
}

/// A coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// One geocoder search result. Short-lived: produced per search, discarded
/// once a selection is made.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeCandidate {
    /// Compact display label, e.g. "Lviv, Lviv Oblast, Ukraine".
    pub label: String,
    /// Full provider display name.
    pub value: String,
    pub lat: String,
    pub lon: String,
    pub place_id: u64,
    pub kind: String,
    pub class: String,
}

/// Current conditions at a point, metric units throughout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub uv_index: f64,
    pub pressure: u32,
    pub visibility_km: f64,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempRange {
    pub min: f64,
    pub max: f64,
}

/// One day of aggregated forecast. Exactly one per calendar date within a
/// forecast set, ordered chronologically starting the day after "today".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub temperature: TempRange,
    pub description: String,
    pub icon: String,
    /// Daily mean, percent.
    pub humidity: u8,
    /// Daily mean, m/s.
    pub wind_speed: f64,
    /// Summed over the day, mm. Zero means none.
    pub precipitation_mm: f64,
}

/// Air-quality readings for a point. Pollutants in µg/m³ (CO in the
/// provider unit); `aqi` is a 0-500 US-scale approximation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualitySnapshot {
    pub aqi: u16,
    pub pm25: f64,
    pub pm10: f64,
    pub co: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
}

/// Failure of a raw HTTP fetch. Caught at the client boundary and turned
/// into an absent result; callers of the clients never see this type.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("unexpected response shape: {0}")]
    Parse(String),
}

/// Failure to resolve the machine's own position. Unlike [`FetchError`],
/// this propagates to the caller so it can decide not to fetch data.
#[derive(Debug, Error)]
pub enum GeolocationError {
    #[error("geolocation is not available on this system")]
    Unavailable,

    #[error("geolocation lookup refused: {0}")]
    Denied(String),

    #[error("geolocation lookup timed out")]
    Timeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_coords_parses_geocoder_strings() {
        let loc = Location {
            label: "Lviv, Ukraine".into(),
            lat: "49.8419".into(),
            lon: "24.0315".into(),
        };

        let coords = loc.coords().expect("valid coordinates must parse");
        assert!((coords.lat - 49.8419).abs() < 1e-9);
        assert!((coords.lon - 24.0315).abs() < 1e-9);
    }

    #[test]
    fn location_coords_rejects_garbage() {
        let loc = Location {
            label: "Nowhere".into(),
            lat: "not-a-number".into(),
            lon: "24.0315".into(),
        };

        assert!(loc.coords().is_none());
    }
}
