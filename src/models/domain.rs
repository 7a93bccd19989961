use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GeoError;

/// A WGS84 point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build a coordinate pair, rejecting NaN and out-of-range values
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        let coords = Self { latitude, longitude };
        coords.validate()?;
        Ok(coords)
    }

    /// Check both components as a unit
    pub fn validate(&self) -> Result<(), GeoError> {
        if crate::core::distance::validate_coordinates(self) {
            Ok(())
        } else {
            Err(GeoError::InvalidCoordinates {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

impl From<Coordinates> for geo::Point<f64> {
    fn from(value: Coordinates) -> Self {
        geo::Point::new(value.longitude, value.latitude)
    }
}

/// Latitude/longitude rectangle around a search center
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

/// Distance in miles plus estimated travel time in minutes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceWithTime {
    pub distance: f64,
    #[serde(rename = "estimatedTravelTime")]
    pub estimated_travel_time: u32,
}

/// A physical location a business operates from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessLocation {
    pub id: Uuid,
    #[serde(rename = "businessId")]
    pub business_id: Uuid,
    pub coordinates: Coordinates,
    /// Miles; `None` means the business serves any distance
    #[serde(rename = "serviceRadius", default)]
    pub service_radius: Option<f64>,
    pub timezone: String,
    #[serde(rename = "isPrimary", default)]
    pub is_primary: bool,
    #[serde(default)]
    pub address: Option<String>,
}

/// A bookable service offered by a business
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    #[serde(rename = "durationMinutes")]
    pub duration_minutes: u32,
    #[serde(rename = "isActive", default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool { true }

/// Business with its locations and (optionally loaded) services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "categoryId", default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub rating: Option<f64>,
    /// Lowest active service price, used for price ordering
    #[serde(rename = "startingPrice", default)]
    pub starting_price: Option<f64>,
    #[serde(rename = "isActive", default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub locations: Vec<BusinessLocation>,
    #[serde(default)]
    pub services: Vec<Service>,
}

impl Business {
    /// The location bookings are validated against: the one flagged primary,
    /// otherwise the first one on record
    pub fn primary_location(&self) -> Option<&BusinessLocation> {
        self.locations
            .iter()
            .find(|location| location.is_primary)
            .or_else(|| self.locations.first())
    }

    /// Lowest price among active services
    pub fn lowest_service_price(&self) -> Option<f64> {
        self.services
            .iter()
            .filter(|service| service.is_active)
            .map(|service| service.price)
            .min_by(f64::total_cmp)
    }
}

/// One ranked proximity match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub business: Business,
    #[serde(rename = "locationId")]
    pub location_id: Uuid,
    /// Miles, rounded to 2 decimals
    pub distance: f64,
    #[serde(rename = "estimatedTravelTime")]
    pub estimated_travel_time: u32,
}

/// Ordering applied to proximity results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Distance,
    Rating,
    Price,
    Name,
}

/// Search parameters for a proximity query
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub radius: f64,
    pub category_id: Option<Uuid>,
    pub sort_by: SortBy,
    pub limit: usize,
    pub offset: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            radius: 25.0,
            category_id: None,
            sort_by: SortBy::Distance,
            limit: 20,
            offset: 0,
        }
    }
}

/// Behavioral switches for a proximity query
#[derive(Debug, Clone, Copy)]
pub struct SearchFlags {
    pub include_services: bool,
    pub validate_service_radius: bool,
}

impl Default for SearchFlags {
    fn default() -> Self {
        Self {
            include_services: false,
            validate_service_radius: true,
        }
    }
}

/// One page of ranked results
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub results: Vec<SearchResult>,
    /// Number of in-range businesses before pagination
    pub total_matched: usize,
}

/// Repository query for candidate businesses
#[derive(Debug, Clone, Default)]
pub struct CandidateFilter {
    pub category_id: Option<Uuid>,
    /// Range hint; repositories may use it to skip far-away rows
    pub bounding_box: Option<BoundingBox>,
    pub include_services: bool,
}

/// How a caller identified the customer's location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LocationInput {
    Coordinates(Coordinates),
    Address { address: String },
    ZipCode {
        #[serde(rename = "zipCode")]
        zip_code: String,
        #[serde(default)]
        country: Option<String>,
    },
}

/// Postal address returned by reverse geocoding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(rename = "postalCode")]
    pub postal_code: Option<String>,
    pub country: Option<String>,
    #[serde(rename = "formattedAddress")]
    pub formatted_address: String,
}

/// Options for booking-location validation
#[derive(Debug, Clone, Copy)]
pub struct ValidationOptions {
    pub include_alternatives: bool,
    pub max_alternative_radius: f64,
    pub max_alternatives: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            include_alternatives: false,
            max_alternative_radius: 25.0,
            max_alternatives: 3,
        }
    }
}

/// Outcome of checking a customer location against a business's service area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingLocationValidation {
    #[serde(rename = "isValid")]
    pub is_valid: bool,
    pub distance: f64,
    #[serde(rename = "estimatedTravelTime")]
    pub estimated_travel_time: u32,
    #[serde(rename = "businessName")]
    pub business_name: String,
    #[serde(rename = "serviceRadius")]
    pub service_radius: Option<f64>,
    #[serde(default)]
    pub alternatives: Vec<SearchResult>,
}
