use std::{fmt, time::Duration};

use thiserror::Error;

/// External lookup a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Geocoding,
    Weather,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Geocoding => "geocoding",
            Service::Weather => "weather",
        }
    }

    /// Message shown to the user when a lookup against this service fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Service::Geocoding => {
                "Unable to find the specified city. Please try another city name."
            }
            Service::Weather => "Error loading weather data. Please try again.",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything that can end a lookup interaction early.
///
/// The `Display` text is the user-facing message. None of these are fatal:
/// the user can always start a new search or location request.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Please enter a city name")]
    EmptyInput,

    #[error("Location access denied. Please search for a city instead.")]
    GeolocationDenied,

    #[error("Geolocation is not supported on this device. Please search for a city instead.")]
    GeolocationUnsupported,

    #[error("Location request timed out after {}s. Please search for a city instead.", .0.as_secs())]
    GeolocationTimeout(Duration),

    /// Geocoding returned no candidates for `query`.
    #[error("{}", Service::Geocoding.failure_message())]
    NotFound { query: String },

    /// `reason` carries the technical detail for logs; the message stays generic.
    #[error("{}", .service.failure_message())]
    LookupFailed { service: Service, reason: String },
}

impl LookupError {
    pub fn failed(service: Service, reason: impl fmt::Display) -> Self {
        LookupError::LookupFailed { service, reason: reason.to_string() }
    }

    /// True for errors raised by the geolocation capability.
    pub fn is_location_error(&self) -> bool {
        matches!(
            self,
            LookupError::GeolocationDenied
                | LookupError::GeolocationUnsupported
                | LookupError::GeolocationTimeout(_)
        )
    }
}
