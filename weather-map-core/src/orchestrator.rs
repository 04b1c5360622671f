//! Wires user actions to the lookups and the map.
//!
//! Both entry points end in the same display sequence: clear the map, fetch
//! weather, add a single marker and zoom in. Every operation takes
//! `&mut self`, so one orchestrator runs one lookup at a time and the marker
//! on the map always belongs to the most recently issued request.

use tokio::time;

use crate::{
    error::LookupError,
    geolocation::{Geolocator, PositionOptions},
    map::{CURRENT_LOCATION_LABEL, MARKER_ZOOM, MapView, Marker},
    model::PlaceResolution,
    provider::{Geocoder, WeatherSource, openweather::OpenWeatherClient},
    state::ViewState,
};

#[derive(Debug)]
pub struct Orchestrator<M: MapView> {
    geocoder: Box<dyn Geocoder>,
    weather: Box<dyn WeatherSource>,
    geolocator: Box<dyn Geolocator>,
    position_options: PositionOptions,
    map: M,
    view: ViewState,
}

impl<M: MapView> Orchestrator<M> {
    pub fn new(
        geocoder: Box<dyn Geocoder>,
        weather: Box<dyn WeatherSource>,
        geolocator: Box<dyn Geolocator>,
        map: M,
    ) -> Self {
        Self {
            geocoder,
            weather,
            geolocator,
            position_options: PositionOptions::default(),
            map,
            view: ViewState::new(),
        }
    }

    /// Use one OpenWeather client for both geocoding and weather.
    pub fn with_openweather(
        client: OpenWeatherClient,
        geolocator: Box<dyn Geolocator>,
        map: M,
    ) -> Self {
        Self::new(Box::new(client.clone()), Box::new(client), geolocator, map)
    }

    pub fn with_position_options(mut self, options: PositionOptions) -> Self {
        self.position_options = options;
        self
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    /// Handle for observing the loading flag from elsewhere.
    pub fn view_state(&self) -> ViewState {
        self.view.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.view.is_loading()
    }

    /// Look up `input` and show its weather.
    ///
    /// Blank input is rejected before any request is made.
    pub async fn search_city(&mut self, input: &str) -> Result<Marker, LookupError> {
        let query = input.trim();
        if query.is_empty() {
            return Err(LookupError::EmptyInput);
        }

        let _loading = self.view.begin();

        let place = self.geocoder.resolve(query).await.inspect_err(|e| {
            tracing::warn!("City search for '{query}' failed: {e:?}");
        })?;

        self.display_weather(place).await
    }

    /// Ask the geolocator for a fresh fix and show its weather.
    ///
    /// If the position can't be obtained the map goes back to the default
    /// region and no weather request is made.
    pub async fn use_current_location(&mut self) -> Result<Marker, LookupError> {
        let _loading = self.view.begin();
        let options = &self.position_options;

        let position =
            match time::timeout(options.timeout, self.geolocator.current_position(options)).await {
                Ok(result) => result,
                Err(_) => Err(LookupError::GeolocationTimeout(options.timeout)),
            };

        match position {
            Ok(coordinate) => self.display_weather(PlaceResolution::unnamed(coordinate)).await,
            Err(e) => {
                tracing::warn!("Geolocation failed: {e:?}");
                self.map.reset_view();
                Err(e)
            }
        }
    }

    async fn display_weather(&mut self, place: PlaceResolution) -> Result<Marker, LookupError> {
        let _loading = self.view.begin();
        self.map.clear_overlays();

        let snapshot = self.weather.current(place.coordinate).await.inspect_err(|e| {
            tracing::warn!("Weather lookup at ({}) failed: {e:?}", place.coordinate);
        })?;

        let title = place.display_name.as_deref().unwrap_or(CURRENT_LOCATION_LABEL);
        let marker = Marker::weather(place.coordinate, title, &snapshot);

        self.map.add_marker(marker.clone());
        self.map.set_view(place.coordinate, MARKER_ZOOM);

        tracing::info!(
            "Showing {} for {title} at ({})",
            snapshot.temperature_label(),
            place.coordinate
        );

        Ok(marker)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc, Mutex,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use async_trait::async_trait;

    use super::*;
    use crate::{
        error::Service,
        geolocation::{FixedPosition, NoGeolocation, Permission},
        map::{DEFAULT_CENTER, DEFAULT_ZOOM, MapCanvas, Viewport},
        model::{Coordinate, WeatherSnapshot},
    };

    #[derive(Debug, Default)]
    struct StubGeocoder {
        places: Vec<PlaceResolution>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Geocoder for StubGeocoder {
        async fn resolve(&self, query: &str) -> Result<PlaceResolution, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.places
                .first()
                .cloned()
                .ok_or_else(|| LookupError::NotFound { query: query.to_string() })
        }
    }

    #[derive(Debug, Default)]
    struct StubWeather {
        fail: bool,
        calls: Arc<AtomicUsize>,
        // Loading flag as seen while the request was in flight.
        loading_seen: Arc<Mutex<Vec<bool>>>,
        view: Option<ViewState>,
    }

    #[async_trait]
    impl WeatherSource for StubWeather {
        async fn current(&self, _at: Coordinate) -> Result<WeatherSnapshot, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(view) = &self.view {
                self.loading_seen.lock().unwrap().push(view.is_loading());
            }
            if self.fail {
                return Err(LookupError::failed(Service::Weather, "status 500"));
            }
            Ok(snapshot())
        }
    }

    #[derive(Debug)]
    struct SlowGeolocator;

    #[async_trait]
    impl Geolocator for SlowGeolocator {
        async fn current_position(&self, _: &PositionOptions) -> Result<Coordinate, LookupError> {
            time::sleep(Duration::from_secs(60)).await;
            Ok(Coordinate::new(0.0, 0.0))
        }
    }

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            temperature_c: 15.2,
            wind_speed_mps: 3.4,
            humidity_pct: 70,
            condition: "clear sky".into(),
            icon: "01d".into(),
        }
    }

    fn london() -> PlaceResolution {
        PlaceResolution::named(Coordinate::new(51.51, -0.13), "London")
    }

    fn orchestrator(
        geocoder: StubGeocoder,
        weather: StubWeather,
        geolocator: Box<dyn Geolocator>,
    ) -> Orchestrator<MapCanvas> {
        Orchestrator::new(Box::new(geocoder), Box::new(weather), geolocator, MapCanvas::default())
    }

    #[tokio::test]
    async fn search_shows_single_marker_at_marker_zoom() {
        let geocoder = StubGeocoder { places: vec![london()], ..Default::default() };
        let mut orch = orchestrator(geocoder, StubWeather::default(), Box::new(NoGeolocation));

        orch.search_city("London").await.unwrap();
        orch.search_city("  London ").await.unwrap();

        let map = orch.map();
        assert_eq!(map.markers().len(), 1);
        assert_eq!(map.markers()[0].position, london().coordinate);
        assert_eq!(map.viewport(), Viewport { center: london().coordinate, zoom: MARKER_ZOOM });
        assert!(!orch.is_loading());
    }

    #[tokio::test]
    async fn blank_search_makes_no_calls() {
        let geo_calls = Arc::new(AtomicUsize::new(0));
        let wx_calls = Arc::new(AtomicUsize::new(0));
        let geocoder = StubGeocoder { places: vec![london()], calls: Arc::clone(&geo_calls) };
        let weather = StubWeather { calls: Arc::clone(&wx_calls), ..Default::default() };
        let mut orch = orchestrator(geocoder, weather, Box::new(NoGeolocation));

        for input in ["", "   ", "\t\n"] {
            let err = orch.search_city(input).await.unwrap_err();
            assert!(matches!(err, LookupError::EmptyInput));
        }

        assert_eq!(geo_calls.load(Ordering::SeqCst), 0);
        assert_eq!(wx_calls.load(Ordering::SeqCst), 0);
        assert!(!orch.is_loading());
    }

    #[tokio::test]
    async fn not_found_skips_weather_call() {
        let wx_calls = Arc::new(AtomicUsize::new(0));
        let weather = StubWeather { calls: Arc::clone(&wx_calls), ..Default::default() };
        let mut orch = orchestrator(StubGeocoder::default(), weather, Box::new(NoGeolocation));

        let err = orch.search_city("Atlantis").await.unwrap_err();

        assert!(matches!(err, LookupError::NotFound { ref query } if query == "Atlantis"));
        assert_eq!(wx_calls.load(Ordering::SeqCst), 0);
        assert!(!orch.is_loading());
    }

    #[tokio::test]
    async fn weather_failure_leaves_no_marker() {
        let geocoder = StubGeocoder { places: vec![london()], ..Default::default() };
        let mut orch = orchestrator(geocoder, StubWeather::default(), Box::new(NoGeolocation));
        orch.search_city("London").await.unwrap();

        orch.weather = Box::new(StubWeather { fail: true, ..Default::default() });
        let err = orch.search_city("London").await.unwrap_err();

        assert!(matches!(err, LookupError::LookupFailed { service: Service::Weather, .. }));
        assert!(orch.map().markers().is_empty());
        assert!(!orch.is_loading());
    }

    #[tokio::test]
    async fn loading_is_set_while_weather_is_fetched() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let geocoder = StubGeocoder { places: vec![london()], ..Default::default() };
        let mut orch = orchestrator(geocoder, StubWeather::default(), Box::new(NoGeolocation));

        orch.weather = Box::new(StubWeather {
            loading_seen: Arc::clone(&seen),
            view: Some(orch.view_state()),
            ..Default::default()
        });

        orch.search_city("London").await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![true]);
        assert!(!orch.is_loading());
    }

    #[tokio::test]
    async fn denied_location_resets_map_without_weather_call() {
        let wx_calls = Arc::new(AtomicUsize::new(0));
        let geocoder = StubGeocoder { places: vec![london()], ..Default::default() };
        let weather = StubWeather { calls: Arc::clone(&wx_calls), ..Default::default() };
        let denied = FixedPosition::new(Coordinate::new(1.0, 1.0), Permission::Denied);
        let mut orch = orchestrator(geocoder, weather, Box::new(denied));

        orch.search_city("London").await.unwrap();
        assert_eq!(wx_calls.load(Ordering::SeqCst), 1);

        let err = orch.use_current_location().await.unwrap_err();

        assert!(matches!(err, LookupError::GeolocationDenied));
        assert_eq!(orch.map().viewport(), Viewport { center: DEFAULT_CENTER, zoom: DEFAULT_ZOOM });
        assert_eq!(wx_calls.load(Ordering::SeqCst), 1);
        assert!(!orch.is_loading());
    }

    #[tokio::test]
    async fn unsupported_location_resets_map_without_weather_call() {
        let wx_calls = Arc::new(AtomicUsize::new(0));
        let geocoder = StubGeocoder { places: vec![london()], ..Default::default() };
        let weather = StubWeather { calls: Arc::clone(&wx_calls), ..Default::default() };
        let mut orch = orchestrator(geocoder, weather, Box::new(NoGeolocation));

        orch.search_city("London").await.unwrap();
        assert_eq!(orch.map().viewport().zoom, MARKER_ZOOM);

        let err = orch.use_current_location().await.unwrap_err();

        assert!(matches!(err, LookupError::GeolocationUnsupported));
        assert!(err.is_location_error());
        assert_eq!(orch.map().viewport(), Viewport { center: DEFAULT_CENTER, zoom: DEFAULT_ZOOM });
        assert_eq!(wx_calls.load(Ordering::SeqCst), 1);
        assert!(!orch.is_loading());
    }

    #[tokio::test]
    async fn granted_location_uses_current_location_label() {
        let here = Coordinate::new(48.85, 2.35);
        let mut orch = orchestrator(
            StubGeocoder::default(),
            StubWeather::default(),
            Box::new(FixedPosition::granted(here)),
        );

        let marker = orch.use_current_location().await.unwrap();

        assert_eq!(marker.position, here);
        assert_eq!(marker.popup.title, CURRENT_LOCATION_LABEL);
        assert_eq!(orch.map().viewport().center, here);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_geolocation_times_out_and_resets_map() {
        let wx_calls = Arc::new(AtomicUsize::new(0));
        let geocoder = StubGeocoder { places: vec![london()], ..Default::default() };
        let weather = StubWeather { calls: Arc::clone(&wx_calls), ..Default::default() };
        let mut orch = orchestrator(geocoder, weather, Box::new(SlowGeolocator));

        orch.search_city("London").await.unwrap();
        assert_eq!(orch.map().viewport().center, london().coordinate);

        let err = orch.use_current_location().await.unwrap_err();

        assert!(matches!(err, LookupError::GeolocationTimeout(d) if d == Duration::from_secs(5)));
        assert_eq!(orch.map().viewport(), Viewport { center: DEFAULT_CENTER, zoom: DEFAULT_ZOOM });
        assert_eq!(wx_calls.load(Ordering::SeqCst), 1);
        assert!(!orch.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn custom_position_timeout_is_enforced() {
        let options = PositionOptions { timeout: Duration::from_secs(2), ..Default::default() };
        let mut orch =
            orchestrator(StubGeocoder::default(), StubWeather::default(), Box::new(SlowGeolocator))
                .with_position_options(options);

        let err = orch.use_current_location().await.unwrap_err();

        assert!(matches!(err, LookupError::GeolocationTimeout(d) if d == Duration::from_secs(2)));
    }
}
