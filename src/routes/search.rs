use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use super::{validation_failed, AppState};
use crate::core::calculate_distance_with_time;
use crate::error::GeoError;
use crate::models::{
    AddressSearchRequest, Coordinates, DistanceRequest, HealthResponse, NearbySearchRequest,
    SearchOptions, SearchPage, SearchResponse, ZipSearchRequest,
};

/// Configure search-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/geo/distance", web::post().to(distance))
        .route("/search/nearby", web::post().to(search_nearby))
        .route("/search/zip", web::post().to(search_by_zip))
        .route("/search/address", web::post().to(search_by_address));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let healthy = match state.repository.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!("Repository health check failed: {}", e);
            false
        }
    };

    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Distance and travel time between two points
///
/// POST /api/v1/geo/distance
async fn distance(req: web::Json<DistanceRequest>) -> Result<HttpResponse, GeoError> {
    req.from.validate()?;
    req.to.validate()?;

    Ok(HttpResponse::Ok().json(calculate_distance_with_time(&req.from, &req.to)))
}

fn respond(center: Coordinates, options: &SearchOptions, page: SearchPage) -> HttpResponse {
    HttpResponse::Ok().json(SearchResponse {
        results: page.results,
        center,
        radius: options.radius,
        total_matched: page.total_matched,
        limit: options.limit,
        offset: options.offset,
    })
}

/// Find businesses near a point
///
/// POST /api/v1/search/nearby
///
/// Request body:
/// ```json
/// {
///   "latitude": 40.7,
///   "longitude": -74.0,
///   "radius": 25,
///   "categoryId": "uuid",
///   "sortBy": "distance|rating|price|name",
///   "limit": 20,
///   "offset": 0,
///   "includeServices": false,
///   "validateServiceRadius": true
/// }
/// ```
async fn search_nearby(
    state: web::Data<AppState>,
    req: web::Json<NearbySearchRequest>,
) -> Result<HttpResponse, GeoError> {
    if let Err(errors) = req.validate() {
        return Ok(validation_failed(errors));
    }

    let center = req.center();
    let options = req.params.to_options(&state.search);
    let page = state
        .matcher
        .search_nearby(&center, &options, req.params.to_flags())
        .await?;

    tracing::info!(
        "Nearby search returned {} of {} results",
        page.results.len(),
        page.total_matched
    );

    Ok(respond(center, &options, page))
}

/// Find businesses near a postal code
///
/// POST /api/v1/search/zip
async fn search_by_zip(
    state: web::Data<AppState>,
    req: web::Json<ZipSearchRequest>,
) -> Result<HttpResponse, GeoError> {
    if let Err(errors) = req.validate() {
        return Ok(validation_failed(errors));
    }

    let options = req.params.to_options(&state.search);
    let center = state
        .matcher
        .resolve_location(&crate::models::LocationInput::ZipCode {
            zip_code: req.zip_code.clone(),
            country: req.country.clone(),
        })
        .await?;
    let page = state
        .matcher
        .search_nearby(&center, &options, req.params.to_flags())
        .await?;

    tracing::info!(
        "Zip search for {} returned {} of {} results",
        req.zip_code,
        page.results.len(),
        page.total_matched
    );

    Ok(respond(center, &options, page))
}

/// Find businesses near a street address
///
/// POST /api/v1/search/address
async fn search_by_address(
    state: web::Data<AppState>,
    req: web::Json<AddressSearchRequest>,
) -> Result<HttpResponse, GeoError> {
    if let Err(errors) = req.validate() {
        return Ok(validation_failed(errors));
    }

    let options = req.params.to_options(&state.search);
    let center = state
        .matcher
        .resolve_location(&crate::models::LocationInput::Address {
            address: req.address.clone(),
        })
        .await?;
    let page = state
        .matcher
        .search_nearby(&center, &options, req.params.to_flags())
        .await?;

    Ok(respond(center, &options, page))
}
