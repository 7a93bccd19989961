use async_trait::async_trait;
use uuid::Uuid;

use crate::core::filters::validate_radius;
use crate::error::GeoError;
use crate::models::{BusinessLocation, Coordinates};
use crate::services::Geocoder;

/// Picks the IANA timezone for a business location
#[async_trait]
pub trait TimezoneDetector: Send + Sync {
    async fn detect(&self, coords: &Coordinates) -> Result<String, GeoError>;
}

/// Nautical-time approximation: one hour per 15° of longitude
///
/// Produces `Etc/GMT±N` zones, which ignore daylight saving and political
/// boundaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongitudeTimezoneDetector;

impl LongitudeTimezoneDetector {
    pub fn zone_for(longitude: f64) -> String {
        let offset_hours = (longitude / 15.0).round().clamp(-12.0, 14.0) as i32;

        // Etc zones use POSIX sign convention: Etc/GMT+5 is UTC-5
        match offset_hours {
            0 => "Etc/UTC".to_string(),
            hours if hours > 0 => format!("Etc/GMT-{}", hours),
            hours => format!("Etc/GMT+{}", -hours),
        }
    }
}

#[async_trait]
impl TimezoneDetector for LongitudeTimezoneDetector {
    async fn detect(&self, coords: &Coordinates) -> Result<String, GeoError> {
        coords.validate()?;
        Ok(Self::zone_for(coords.longitude))
    }
}

/// Geocode an address into a new location record for a business
pub async fn build_business_location(
    business_id: Uuid,
    address: &str,
    service_radius: Option<f64>,
    geocoder: &dyn Geocoder,
    timezones: &dyn TimezoneDetector,
) -> Result<BusinessLocation, GeoError> {
    if let Some(radius) = service_radius {
        validate_radius(radius)?;
    }

    let coordinates = geocoder.geocode_address(address).await?;
    coordinates.validate()?;

    let timezone = timezones.detect(&coordinates).await?;

    tracing::info!(
        "Resolved location for business {} at ({}, {}) in {}",
        business_id,
        coordinates.latitude,
        coordinates.longitude,
        timezone
    );

    Ok(BusinessLocation {
        id: Uuid::new_v4(),
        business_id,
        coordinates,
        service_radius,
        timezone,
        is_primary: false,
        address: Some(address.trim().to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_for_longitude() {
        assert_eq!(LongitudeTimezoneDetector::zone_for(-74.0), "Etc/GMT+5");
        assert_eq!(LongitudeTimezoneDetector::zone_for(2.35), "Etc/UTC");
        assert_eq!(LongitudeTimezoneDetector::zone_for(139.7), "Etc/GMT-9");
        assert_eq!(LongitudeTimezoneDetector::zone_for(-180.0), "Etc/GMT+12");
    }

    #[tokio::test]
    async fn test_detect_rejects_invalid() {
        let detector = LongitudeTimezoneDetector;
        let result = detector.detect(&Coordinates { latitude: 0.0, longitude: 200.0 }).await;
        assert!(matches!(result, Err(GeoError::InvalidCoordinates { .. })));
    }
}
