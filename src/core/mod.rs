// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod location;
pub mod matcher;
pub mod ranking;
pub mod validator;

pub use distance::{
    calculate_distance, calculate_distance_with_time, create_bounding_box, estimate_travel_time,
    is_within_bounding_box, validate_coordinates, with_travel_time,
};
pub use filters::{is_in_range, validate_radius, within_service_radius, MAX_SEARCH_RADIUS_MILES};
pub use location::{build_business_location, LongitudeTimezoneDetector, TimezoneDetector};
pub use matcher::{rank_candidates, ProximityMatcher};
pub use ranking::{paginate, sort_results};
