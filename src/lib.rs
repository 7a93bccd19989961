//! BiaBook Geo - proximity search and service-area matching for BiaBook
//!
//! This library provides the geospatial core behind business search and
//! booking-location validation: Haversine distances with travel-time
//! estimates, bounding-box pre-filtering, and ranked proximity search over
//! a pluggable business repository and geocoder.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    ProximityMatcher,
    distance::{calculate_distance, calculate_distance_with_time, create_bounding_box, estimate_travel_time, is_within_bounding_box, validate_coordinates},
};
pub use error::GeoError;
pub use models::{Coordinates, BoundingBox, Business, BusinessLocation, SearchResult, SearchOptions, SearchFlags, SortBy};
