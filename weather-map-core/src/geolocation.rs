//! Device position capability.
//!
//! [`Geolocator`] stands in for a platform geolocation API. The orchestrator
//! enforces [`PositionOptions::timeout`] around every request, so
//! implementations only need to honor the permission and freshness rules.

use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;

use crate::{config::LocationConfig, error::LookupError, model::Coordinate};

#[derive(Debug, Clone, PartialEq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest acceptable cached fix. Zero means a fresh fix is required.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(5),
            maximum_age: Duration::ZERO,
        }
    }
}

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn current_position(&self, options: &PositionOptions) -> Result<Coordinate, LookupError>;
}

/// A device without any position source.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

#[async_trait]
impl Geolocator for NoGeolocation {
    async fn current_position(&self, _: &PositionOptions) -> Result<Coordinate, LookupError> {
        Err(LookupError::GeolocationUnsupported)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Position supplied by the user (flags or config), gated by a permission.
///
/// The fix is read on every request, never cached, so it always satisfies
/// `maximum_age`.
#[derive(Debug, Clone)]
pub struct FixedPosition {
    coordinate: Coordinate,
    permission: Permission,
}

impl FixedPosition {
    pub fn new(coordinate: Coordinate, permission: Permission) -> Self {
        Self { coordinate, permission }
    }

    pub fn granted(coordinate: Coordinate) -> Self {
        Self::new(coordinate, Permission::Granted)
    }
}

#[async_trait]
impl Geolocator for FixedPosition {
    async fn current_position(&self, options: &PositionOptions) -> Result<Coordinate, LookupError> {
        match self.permission {
            Permission::Granted => {
                tracing::debug!(
                    high_accuracy = options.enable_high_accuracy,
                    "Using configured position {}",
                    self.coordinate
                );
                Ok(self.coordinate)
            }
            Permission::Denied => Err(LookupError::GeolocationDenied),
        }
    }
}

/// Pick the geolocator matching the `[location]` config section.
pub fn geolocator_from_config(location: Option<&LocationConfig>) -> Box<dyn Geolocator> {
    match location {
        None => Box::new(NoGeolocation),
        Some(loc) => {
            let permission = if loc.share { Permission::Granted } else { Permission::Denied };
            Box::new(FixedPosition::new(Coordinate::new(loc.latitude, loc.longitude), permission))
        }
    }
}
