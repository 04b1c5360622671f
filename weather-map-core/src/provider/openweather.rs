use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    error::{LookupError, Service},
    model::{Coordinate, PlaceResolution, WeatherSnapshot},
};

use super::{Geocoder, WeatherSource};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

const GEOCODING_PATH: &str = "/geo/1.0/direct";
const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";

/// OpenWeather geocoding and current-weather client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        service: Service,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, LookupError> {
        let url = format!("{}{}", self.base_url, path);

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(%service, "Failed to send request to OpenWeather: {e}");
                LookupError::failed(service, e)
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            tracing::warn!(%service, "Failed to read OpenWeather response body: {e}");
            LookupError::failed(service, e)
        })?;

        if !status.is_success() {
            let reason = format!("status {}: {}", status, truncate_body(&body));
            tracing::warn!(%service, "OpenWeather request failed with {reason}");
            return Err(LookupError::failed(service, reason));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(%service, "Failed to parse OpenWeather JSON: {e}");
            LookupError::failed(service, e)
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoMatch {
    name: String,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
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
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

impl OwCurrentResponse {
    fn into_snapshot(self) -> Option<WeatherSnapshot> {
        let condition = self.weather.into_iter().next()?;

        Some(WeatherSnapshot {
            temperature_c: self.main.temp,
            wind_speed_mps: self.wind.speed,
            humidity_pct: self.main.humidity,
            condition: condition.description,
            icon: condition.icon,
        })
    }
}

#[async_trait]
impl Geocoder for OpenWeatherClient {
    async fn resolve(&self, query: &str) -> Result<PlaceResolution, LookupError> {
        tracing::debug!("Geocoding '{query}'");

        let matches: Vec<OwGeoMatch> = self
            .get_json(Service::Geocoding, GEOCODING_PATH, &[("q", query), ("limit", "1")])
            .await?;

        let first = matches
            .into_iter()
            .next()
            .ok_or_else(|| LookupError::NotFound { query: query.to_string() })?;

        let coordinate = Coordinate::new(first.lat, first.lon);
        tracing::info!("Geocoded '{query}' to {} at ({coordinate})", first.name);

        Ok(PlaceResolution::named(coordinate, first.name))
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn current(&self, at: Coordinate) -> Result<WeatherSnapshot, LookupError> {
        let lat = at.latitude.to_string();
        let lon = at.longitude.to_string();

        let parsed: OwCurrentResponse = self
            .get_json(
                Service::Weather,
                CURRENT_WEATHER_PATH,
                &[
                    ("lat", lat.as_str()),
                    ("lon", lon.as_str()),
                    ("units", "metric"),
                    ("lang", "en"),
                ],
            )
            .await?;

        parsed.into_snapshot().ok_or_else(|| {
            LookupError::failed(Service::Weather, "response contained no condition data")
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
