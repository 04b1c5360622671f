use std::fmt;

use serde::{Deserialize, Serialize};

const ICON_BASE_URL: &str = "https://openweathermap.org/img/w";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A resolved location, from geocoding or from the geolocation capability.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceResolution {
    pub coordinate: Coordinate,
    /// Geocoded name; `None` for a raw position fix.
    pub display_name: Option<String>,
}

impl PlaceResolution {
    pub fn named(coordinate: Coordinate, name: impl Into<String>) -> Self {
        Self { coordinate, display_name: Some(name.into()) }
    }

    pub fn unnamed(coordinate: Coordinate) -> Self {
        Self { coordinate, display_name: None }
    }
}

/// Current conditions at a coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature_c: f64,
    pub wind_speed_mps: f64,
    pub humidity_pct: u8,
    pub condition: String,
    /// OpenWeather icon id, e.g. `01d`.
    pub icon: String,
}

impl WeatherSnapshot {
    pub fn temperature_label(&self) -> String {
        format!("{:.1}°C", self.temperature_c)
    }

    pub fn wind_label(&self) -> String {
        format!("Wind: {:.1} m/s", self.wind_speed_mps)
    }

    pub fn humidity_label(&self) -> String {
        format!("Humidity: {}%", self.humidity_pct)
    }

    pub fn icon_url(&self) -> String {
        format!("{ICON_BASE_URL}/{}.png", self.icon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            temperature_c: 15.24,
            wind_speed_mps: 3.36,
            humidity_pct: 70,
            condition: "clear sky".into(),
            icon: "01d".into(),
        }
    }

    #[test]
    fn labels_round_to_one_decimal() {
        let s = snapshot();
        assert_eq!(s.temperature_label(), "15.2°C");
        assert_eq!(s.wind_label(), "Wind: 3.4 m/s");
        assert_eq!(s.humidity_label(), "Humidity: 70%");
    }

    #[test]
    fn negative_temperature_keeps_sign() {
        let s = WeatherSnapshot { temperature_c: -3.04, ..snapshot() };
        assert_eq!(s.temperature_label(), "-3.0°C");
    }

    #[test]
    fn icon_url_points_at_openweather_images() {
        assert_eq!(snapshot().icon_url(), "https://openweathermap.org/img/w/01d.png");
    }

    #[test]
    fn coordinate_display_uses_four_decimals() {
        let c = Coordinate::new(51.50853, -0.12574);
        assert_eq!(c.to_string(), "51.5085, -0.1257");
    }
}
