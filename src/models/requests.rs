use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::config::SearchSettings;
use crate::models::domain::{Coordinates, SearchFlags, SearchOptions, SortBy, ValidationOptions};

/// Paging, ordering and filtering shared by every search request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub radius: Option<f64>,
    pub category_id: Option<Uuid>,
    pub sort_by: Option<SortBy>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub include_services: Option<bool>,
    pub validate_service_radius: Option<bool>,
}

impl SearchParams {
    /// Fill gaps from configured defaults; the limit is capped at `max_limit`
    pub fn to_options(&self, settings: &SearchSettings) -> SearchOptions {
        SearchOptions {
            radius: self.radius.unwrap_or(settings.default_radius_miles),
            category_id: self.category_id,
            sort_by: self.sort_by.unwrap_or_default(),
            limit: self.limit.unwrap_or(settings.default_limit).min(settings.max_limit),
            offset: self.offset.unwrap_or(0),
        }
    }

    pub fn to_flags(&self) -> SearchFlags {
        let defaults = SearchFlags::default();
        SearchFlags {
            include_services: self.include_services.unwrap_or(defaults.include_services),
            validate_service_radius: self
                .validate_service_radius
                .unwrap_or(defaults.validate_service_radius),
        }
    }
}

/// Search around raw coordinates
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NearbySearchRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[serde(flatten)]
    pub params: SearchParams,
}

impl NearbySearchRequest {
    pub fn center(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Search around a postal code
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ZipSearchRequest {
    #[validate(length(min = 3, max = 10))]
    #[serde(alias = "zip_code", rename = "zipCode")]
    pub zip_code: String,
    #[validate(length(equal = 2))]
    pub country: Option<String>,
    #[serde(flatten)]
    pub params: SearchParams,
}

/// Search around a street address
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddressSearchRequest {
    #[validate(length(min = 1, max = 500))]
    pub address: String,
    #[serde(flatten)]
    pub params: SearchParams,
}

/// Check a customer location against a business's service area
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ValidateLocationRequest {
    #[serde(alias = "business_id", rename = "businessId")]
    pub business_id: Uuid,
    #[serde(rename = "customerLocation")]
    pub customer_location: Coordinates,
    #[serde(rename = "includeAlternatives", default)]
    pub include_alternatives: bool,
    #[validate(range(exclusive_min = 0.0, max = 500.0))]
    #[serde(rename = "maxAlternativeRadius")]
    pub max_alternative_radius: Option<f64>,
    #[validate(range(max = 20))]
    #[serde(rename = "maxAlternatives")]
    pub max_alternatives: Option<usize>,
}

impl ValidateLocationRequest {
    pub fn to_options(&self, settings: &SearchSettings) -> ValidationOptions {
        ValidationOptions {
            include_alternatives: self.include_alternatives,
            max_alternative_radius: self
                .max_alternative_radius
                .unwrap_or(settings.max_alternative_radius_miles),
            max_alternatives: self.max_alternatives.unwrap_or(settings.max_alternatives),
        }
    }
}

/// Distance between two points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceRequest {
    pub from: Coordinates,
    pub to: Coordinates,
}

/// Geocode an address into a business location
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResolveLocationRequest {
    #[serde(alias = "business_id", rename = "businessId")]
    pub business_id: Uuid,
    #[validate(length(min = 1, max = 500))]
    pub address: String,
    #[serde(rename = "serviceRadius", default)]
    pub service_radius: Option<f64>,
}
