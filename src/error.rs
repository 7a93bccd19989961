use thiserror::Error;

use crate::services::{GeocodeError, RepositoryError};

/// Failures surfaced by the proximity core
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("Invalid radius: {0} miles (must be greater than 0 and at most 500)")]
    InvalidRadius(f64),

    #[error("Geocoding failed: {0}")]
    GeocodingFailed(String),

    #[error("Business not found: {0}")]
    BusinessNotFound(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<GeocodeError> for GeoError {
    fn from(value: GeocodeError) -> Self {
        GeoError::GeocodingFailed(value.to_string())
    }
}
