use crate::{
    Config, LookupError,
    model::{Coordinate, PlaceResolution, WeatherSnapshot},
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Resolves a free-text place name to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// `query` is already trimmed and non-empty.
    async fn resolve(&self, query: &str) -> Result<PlaceResolution, LookupError>;
}

/// Fetches current conditions at a coordinate.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn current(&self, at: Coordinate) -> Result<WeatherSnapshot, LookupError>;
}

/// Build the OpenWeather client from config, with an optional explicit key.
pub fn client_from_config(
    config: &Config,
    api_key: Option<&str>,
) -> anyhow::Result<OpenWeatherClient> {
    let api_key = config.resolve_api_key(api_key)?;

    let client = match config.base_url.as_deref() {
        Some(base) => OpenWeatherClient::with_base_url(api_key, base),
        None => OpenWeatherClient::new(api_key),
    };

    Ok(client)
}
