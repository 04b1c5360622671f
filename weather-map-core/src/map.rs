//! Map view state: viewport, tile layer and the weather marker overlay.
//!
//! [`MapView`] is the seam the orchestrator talks to. [`MapCanvas`] is the
//! in-memory implementation used by the CLI and the tests; it keeps the same
//! state a browser map would and renders it as text.

use std::{f64::consts::PI, fmt};

use crate::model::{Coordinate, WeatherSnapshot};

/// Region shown before any lookup and after a failed location request.
pub const DEFAULT_CENTER: Coordinate = Coordinate::new(20.5937, 78.9629);
pub const DEFAULT_ZOOM: u8 = 5;
/// Zoom used when centering on a weather marker.
pub const MARKER_ZOOM: u8 = 10;
pub const MAX_ZOOM: u8 = 19;

/// Popup title used when the location has no geocoded name.
pub const CURRENT_LOCATION_LABEL: &str = "Current Location";

const OSM_TILE_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const OSM_ATTRIBUTION: &str = "© OpenStreetMap contributors";
const OSM_SUBDOMAINS: [&str; 3] = ["a", "b", "c"];

// Web Mercator stops short of the poles.
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: u8,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { center: DEFAULT_CENTER, zoom: DEFAULT_ZOOM }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
    pub max_zoom: u8,
}

impl Default for TileLayer {
    fn default() -> Self {
        Self {
            url_template: OSM_TILE_TEMPLATE.to_string(),
            attribution: OSM_ATTRIBUTION.to_string(),
            max_zoom: MAX_ZOOM,
        }
    }
}

impl TileLayer {
    /// URL of the tile containing the viewport center.
    pub fn tile_url(&self, viewport: &Viewport) -> String {
        let (x, y) = tile_index(viewport.center, viewport.zoom);
        let subdomain = OSM_SUBDOMAINS[((x + y) % OSM_SUBDOMAINS.len() as u64) as usize];

        self.url_template
            .replace("{s}", subdomain)
            .replace("{z}", &viewport.zoom.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

/// Slippy-map tile index for a coordinate at a zoom level.
fn tile_index(at: Coordinate, zoom: u8) -> (u64, u64) {
    let n = 2f64.powi(i32::from(zoom));
    let max_index = n - 1.0;

    let lat = at.latitude.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let x = ((at.longitude + 180.0) / 360.0 * n).floor();
    let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * n).floor();

    (x.clamp(0.0, max_index) as u64, y.clamp(0.0, max_index) as u64)
}

/// Popup content attached to a weather marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub title: String,
    pub icon_url: String,
    pub temperature: String,
    pub condition: String,
    pub wind: String,
    pub humidity: String,
}

impl Popup {
    pub fn new(title: &str, snapshot: &WeatherSnapshot) -> Self {
        Self {
            title: title.to_string(),
            icon_url: snapshot.icon_url(),
            temperature: snapshot.temperature_label(),
            condition: snapshot.condition.clone(),
            wind: snapshot.wind_label(),
            humidity: snapshot.humidity_label(),
        }
    }
}

impl fmt::Display for Popup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "  icon: {}", self.icon_url)?;
        writeln!(f, "  {}", self.temperature)?;
        writeln!(f, "  {}", self.condition)?;
        writeln!(f, "  {}", self.wind)?;
        write!(f, "  {}", self.humidity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: Coordinate,
    pub icon_url: String,
    pub popup: Popup,
}

impl Marker {
    pub fn weather(position: Coordinate, title: &str, snapshot: &WeatherSnapshot) -> Self {
        Self { position, icon_url: snapshot.icon_url(), popup: Popup::new(title, snapshot) }
    }
}

/// Operations the orchestrator needs from a map.
pub trait MapView {
    /// Center the map; zoom is clamped to the tile layer's maximum.
    fn set_view(&mut self, center: Coordinate, zoom: u8);

    /// Remove every marker and overlay.
    fn clear_overlays(&mut self);

    fn add_marker(&mut self, marker: Marker);

    fn viewport(&self) -> Viewport;

    fn markers(&self) -> &[Marker];

    fn reset_view(&mut self) {
        self.set_view(DEFAULT_CENTER, DEFAULT_ZOOM);
    }
}

#[derive(Debug, Clone, Default)]
pub struct MapCanvas {
    viewport: Viewport,
    tiles: TileLayer,
    markers: Vec<Marker>,
}

impl MapCanvas {
    pub fn new(tiles: TileLayer) -> Self {
        Self { viewport: Viewport::default(), tiles, markers: Vec::new() }
    }

    pub fn tiles(&self) -> &TileLayer {
        &self.tiles
    }

    pub fn center_tile_url(&self) -> String {
        self.tiles.tile_url(&self.viewport)
    }
}

impl MapView for MapCanvas {
    fn set_view(&mut self, center: Coordinate, zoom: u8) {
        self.viewport = Viewport { center, zoom: zoom.min(self.tiles.max_zoom) };
    }

    fn clear_overlays(&mut self) {
        self.markers.clear();
    }

    fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn markers(&self) -> &[Marker] {
        &self.markers
    }
}

impl fmt::Display for MapCanvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Map centered on {} (zoom {})", self.viewport.center, self.viewport.zoom)?;
        writeln!(f, "Tile: {}", self.center_tile_url())?;

        for marker in &self.markers {
            writeln!(f, "Marker at {}", marker.position)?;
            writeln!(f, "{}", marker.popup)?;
        }

        write!(f, "{}", self.tiles.attribution)
    }
}
