use crate::error::GeoError;
use crate::models::{Business, CandidateFilter};

/// Largest search radius accepted, in miles
pub const MAX_SEARCH_RADIUS_MILES: f64 = 500.0;

/// Reject radii that are non-positive, non-finite, or above the maximum
#[inline]
pub fn validate_radius(radius_miles: f64) -> Result<(), GeoError> {
    if radius_miles.is_finite() && radius_miles > 0.0 && radius_miles <= MAX_SEARCH_RADIUS_MILES {
        Ok(())
    } else {
        Err(GeoError::InvalidRadius(radius_miles))
    }
}

/// Whether the business is willing to serve a customer this far away
///
/// `None` means the business has no service-area limit.
#[inline]
pub fn within_service_radius(distance_miles: f64, service_radius: Option<f64>) -> bool {
    match service_radius {
        Some(radius) => distance_miles <= radius,
        None => true,
    }
}

/// Combined range check applied to each candidate location
///
/// Stage 2 of the proximity pipeline: the search radius always applies,
/// the business's own service radius only when requested.
#[inline]
pub fn is_in_range(
    distance_miles: f64,
    search_radius: f64,
    service_radius: Option<f64>,
    validate_service_radius: bool,
) -> bool {
    if distance_miles > search_radius {
        return false;
    }

    !validate_service_radius || within_service_radius(distance_miles, service_radius)
}

/// Check a business against the repository-level candidate filter
///
/// Inactive businesses are never candidates.
#[inline]
pub fn matches_candidate_filter(business: &Business, filter: &CandidateFilter) -> bool {
    if !business.is_active {
        return false;
    }

    if let Some(category_id) = filter.category_id {
        if business.category_id != Some(category_id) {
            return false;
        }
    }

    match &filter.bounding_box {
        Some(bbox) => business
            .locations
            .iter()
            .any(|location| super::distance::is_within_bounding_box(&location.coordinates, bbox)),
        None => true,
    }
}
