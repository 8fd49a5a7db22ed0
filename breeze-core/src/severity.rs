//! Severity banding for AQI, individual pollutants and UV index.
//!
//! Pure functions: every real input maps to exactly one band, with the
//! highest band acting as an open-ended ceiling. All scales are closed-open
//! on the upper bound, so a value exactly at a breakpoint belongs to the
//! lower band.

/// US-style AQI severity band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AqiBand {
    Good,
    Moderate,
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiBand {
    /// Breakpoints: ≤50, ≤100, ≤150, ≤200, ≤300, above.
    pub fn classify(aqi: u16) -> Self {
        match aqi {
            0..=50 => AqiBand::Good,
            51..=100 => AqiBand::Moderate,
            101..=150 => AqiBand::UnhealthySensitive,
            151..=200 => AqiBand::Unhealthy,
            201..=300 => AqiBand::VeryUnhealthy,
            _ => AqiBand::Hazardous,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiBand::Good => "Good",
            AqiBand::Moderate => "Moderate",
            AqiBand::UnhealthySensitive => "Unhealthy for Sensitive Groups",
            AqiBand::Unhealthy => "Unhealthy",
            AqiBand::VeryUnhealthy => "Very Unhealthy",
            AqiBand::Hazardous => "Hazardous",
        }
    }

    pub fn health_tip(&self) -> &'static str {
        match self {
            AqiBand::Good => "Air quality is satisfactory",
            AqiBand::Moderate => "Air quality is acceptable for most people",
            AqiBand::UnhealthySensitive => {
                "Members of sensitive groups may experience health effects"
            }
            AqiBand::Unhealthy => "Everyone may begin to experience health effects",
            AqiBand::VeryUnhealthy => "Health warnings of emergency conditions",
            AqiBand::Hazardous => {
                "Health alert: everyone may experience serious health effects"
            }
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            AqiBand::Good => "Safe to go outside. Perfect for outdoor activities!",
            AqiBand::Moderate => {
                "Sensitive groups should consider reducing prolonged outdoor exertion."
            }
            AqiBand::UnhealthySensitive => {
                "Sensitive individuals should wear masks and limit outdoor activities."
            }
            AqiBand::Unhealthy => {
                "Everyone should wear masks outdoors. Limit extended outdoor activities."
            }
            AqiBand::VeryUnhealthy => {
                "Avoid outdoor activities. Stay indoors with windows closed."
            }
            AqiBand::Hazardous => {
                "Stay indoors. Use air purifiers. Seek medical attention if feeling unwell."
            }
        }
    }
}

/// Pollutants with a dedicated concentration scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pollutant {
    Pm25,
    Pm10,
    O3,
    No2,
}

impl Pollutant {
    pub fn label(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::O3 => "Ozone",
            Pollutant::No2 => "NO₂",
        }
    }

    /// Concentration breakpoints (µg/m³) separating the four bands.
    fn thresholds(&self) -> [f64; 3] {
        match self {
            Pollutant::Pm25 => [12.0, 35.0, 55.0],
            Pollutant::Pm10 => [20.0, 50.0, 100.0],
            Pollutant::O3 => [100.0, 160.0, 240.0],
            Pollutant::No2 => [40.0, 80.0, 180.0],
        }
    }
}

/// Severity band for a single pollutant concentration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollutantBand {
    Good,
    Moderate,
    Unhealthy,
    Hazardous,
}

impl PollutantBand {
    pub fn classify(pollutant: Pollutant, value: f64) -> Self {
        let [good, moderate, unhealthy] = pollutant.thresholds();
        if value <= good {
            PollutantBand::Good
        } else if value <= moderate {
            PollutantBand::Moderate
        } else if value <= unhealthy {
            PollutantBand::Unhealthy
        } else {
            PollutantBand::Hazardous
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PollutantBand::Good => "Good",
            PollutantBand::Moderate => "Moderate",
            PollutantBand::Unhealthy => "Unhealthy",
            PollutantBand::Hazardous => "Hazardous",
        }
    }
}

/// UV index severity band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UvBand {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl UvBand {
    /// Breakpoints: ≤2, ≤5, ≤7, ≤10, above.
    pub fn classify(uv_index: f64) -> Self {
        if uv_index <= 2.0 {
            UvBand::Low
        } else if uv_index <= 5.0 {
            UvBand::Moderate
        } else if uv_index <= 7.0 {
            UvBand::High
        } else if uv_index <= 10.0 {
            UvBand::VeryHigh
        } else {
            UvBand::Extreme
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UvBand::Low => "Low",
            UvBand::Moderate => "Moderate",
            UvBand::High => "High",
            UvBand::VeryHigh => "Very High",
            UvBand::Extreme => "Extreme",
        }
    }
}
