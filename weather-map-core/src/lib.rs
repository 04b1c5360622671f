//! Core library for the `weather-map` tool.
//!
//! This crate defines:
//! - The map view state (viewport, tile layer, weather marker)
//! - OpenWeather geocoding and current-weather clients
//! - The geolocation capability abstraction
//! - The orchestrator wiring a search or a position fix to the map
//! - Configuration & credentials handling
//!
//! It is used by `weather-map-cli`, but any front end owning a [`MapView`]
//! can drive an [`Orchestrator`].

pub mod config;
pub mod error;
pub mod geolocation;
pub mod map;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod state;

pub use config::{Config, LocationConfig};
pub use error::{LookupError, Service};
pub use geolocation::{FixedPosition, Geolocator, NoGeolocation, Permission, PositionOptions};
pub use map::{MapCanvas, MapView, Marker, Popup, TileLayer, Viewport};
pub use model::{Coordinate, PlaceResolution, WeatherSnapshot};
pub use orchestrator::Orchestrator;
pub use provider::{Geocoder, WeatherSource, openweather::OpenWeatherClient};
pub use state::{LoadingGuard, ViewState};
