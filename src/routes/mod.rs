// Route exports
pub mod locations;
pub mod search;

use actix_web::{error, http::StatusCode, web, HttpResponse};
use std::sync::Arc;

use crate::config::SearchSettings;
use crate::core::{ProximityMatcher, TimezoneDetector};
use crate::error::GeoError;
use crate::models::ErrorResponse;
use crate::services::{BusinessRepository, Geocoder};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn BusinessRepository>,
    pub geocoder: Arc<dyn Geocoder>,
    pub timezones: Arc<dyn TimezoneDetector>,
    pub matcher: ProximityMatcher,
    pub search: SearchSettings,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn BusinessRepository>,
        geocoder: Arc<dyn Geocoder>,
        timezones: Arc<dyn TimezoneDetector>,
        search: SearchSettings,
    ) -> Self {
        Self {
            matcher: ProximityMatcher::new(repository.clone(), geocoder.clone()),
            repository,
            geocoder,
            timezones,
            search,
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(search::configure)
            .configure(locations::configure),
    );
}

impl GeoError {
    fn kind(&self) -> &'static str {
        match self {
            GeoError::InvalidCoordinates { .. } => "invalid_coordinates",
            GeoError::InvalidRadius(_) => "invalid_radius",
            GeoError::GeocodingFailed(_) => "geocoding_failed",
            GeoError::BusinessNotFound(_) => "business_not_found",
            GeoError::Repository(_) => "repository_error",
        }
    }
}

impl error::ResponseError for GeoError {
    fn status_code(&self) -> StatusCode {
        match self {
            GeoError::InvalidCoordinates { .. } | GeoError::InvalidRadius(_) => StatusCode::BAD_REQUEST,
            GeoError::GeocodingFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GeoError::BusinessNotFound(_) => StatusCode::NOT_FOUND,
            GeoError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}

/// 400 response for request bodies that fail field validation
pub(crate) fn validation_failed(errors: validator::ValidationErrors) -> HttpResponse {
    tracing::info!("Validation failed: {}", errors);
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "validation_failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    let message = format!("Invalid JSON: {}", err);
    error::InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(ErrorResponse {
            error: "invalid_json".to_string(),
            message,
            status_code: 400,
        }),
    )
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    let message = format!("Invalid query: {}", err);
    error::InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(ErrorResponse {
            error: "invalid_query".to_string(),
            message,
            status_code: 400,
        }),
    )
    .into()
}
