use actix_web::{web, HttpResponse};
use validator::Validate;

use super::{validation_failed, AppState};
use crate::core::build_business_location;
use crate::error::GeoError;
use crate::models::{ResolveLocationRequest, ValidateLocationRequest};

/// Configure booking and location routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/bookings/validate-location", web::post().to(validate_location))
        .route("/locations/resolve", web::post().to(resolve_location));
}

/// Check whether a business serves the customer's location
///
/// POST /api/v1/bookings/validate-location
///
/// Request body:
/// ```json
/// {
///   "businessId": "uuid",
///   "customerLocation": { "latitude": 40.7, "longitude": -74.0 },
///   "includeAlternatives": true,
///   "maxAlternativeRadius": 25,
///   "maxAlternatives": 3
/// }
/// ```
async fn validate_location(
    state: web::Data<AppState>,
    req: web::Json<ValidateLocationRequest>,
) -> Result<HttpResponse, GeoError> {
    if let Err(errors) = req.validate() {
        return Ok(validation_failed(errors));
    }

    let result = state
        .matcher
        .validate_booking_location(
            req.business_id,
            &req.customer_location,
            req.to_options(&state.search),
        )
        .await?;

    tracing::info!(
        "Booking location for {} valid={} ({}mi)",
        req.business_id,
        result.is_valid,
        result.distance
    );

    Ok(HttpResponse::Ok().json(result))
}

/// Geocode an address into a location record with coordinates and timezone
///
/// POST /api/v1/locations/resolve
async fn resolve_location(
    state: web::Data<AppState>,
    req: web::Json<ResolveLocationRequest>,
) -> Result<HttpResponse, GeoError> {
    if let Err(errors) = req.validate() {
        return Ok(validation_failed(errors));
    }

    let location = build_business_location(
        req.business_id,
        &req.address,
        req.service_radius,
        state.geocoder.as_ref(),
        state.timezones.as_ref(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(location))
}
