use std::sync::Arc;

use crate::core::{
    distance::{calculate_distance, create_bounding_box, with_travel_time},
    filters::{is_in_range, validate_radius},
    ranking::{paginate, sort_results},
};
use crate::error::GeoError;
use crate::models::{
    Business, CandidateFilter, Coordinates, LocationInput, SearchFlags, SearchOptions, SearchPage,
    SearchResult,
};
use crate::services::{BusinessRepository, Geocoder};

/// Rank a candidate set around a center point
///
/// # Pipeline Stages
/// 1. Validate center and radius (nothing is computed on failure)
/// 2. Exact distance per candidate location
/// 3. Search-radius and service-radius filtering on the unrounded distance
/// 4. Stable sort by the requested key
/// 5. Offset/limit pagination
///
/// A business with several locations is ranked once, by its nearest
/// in-range location.
pub fn rank_candidates(
    center: &Coordinates,
    candidates: Vec<Business>,
    options: &SearchOptions,
    flags: SearchFlags,
) -> Result<SearchPage, GeoError> {
    center.validate()?;
    validate_radius(options.radius)?;

    let mut results: Vec<SearchResult> = candidates
        .into_iter()
        .filter_map(|mut business| {
            let nearest = business
                .locations
                .iter()
                .map(|location| (location, calculate_distance(center, &location.coordinates)))
                .filter(|(location, distance)| {
                    is_in_range(
                        *distance,
                        options.radius,
                        location.service_radius,
                        flags.validate_service_radius,
                    )
                })
                .min_by(|(_, a), (_, b)| a.total_cmp(b))
                .map(|(location, distance)| (location.id, with_travel_time(distance)))?;

            if !flags.include_services {
                business.services.clear();
            }

            let (location_id, measured) = nearest;
            Some(SearchResult {
                business,
                location_id,
                distance: measured.distance,
                estimated_travel_time: measured.estimated_travel_time,
            })
        })
        .collect();

    sort_results(&mut results, options.sort_by);

    let total_matched = results.len();

    Ok(SearchPage {
        results: paginate(results, options.offset, options.limit),
        total_matched,
    })
}

/// Proximity search over the business repository
///
/// Every call loads its own candidate set; nothing is cached here.
#[derive(Clone)]
pub struct ProximityMatcher {
    pub(crate) repository: Arc<dyn BusinessRepository>,
    pub(crate) geocoder: Arc<dyn Geocoder>,
}

impl ProximityMatcher {
    pub fn new(repository: Arc<dyn BusinessRepository>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            repository,
            geocoder,
        }
    }

    /// Find businesses around a point
    pub async fn search_nearby(
        &self,
        center: &Coordinates,
        options: &SearchOptions,
        flags: SearchFlags,
    ) -> Result<SearchPage, GeoError> {
        center.validate()?;
        validate_radius(options.radius)?;

        let filter = CandidateFilter {
            category_id: options.category_id,
            bounding_box: Some(create_bounding_box(center, options.radius)),
            include_services: flags.include_services,
        };

        let candidates = self.repository.find_all(&filter).await?;
        let candidate_count = candidates.len();

        let page = rank_candidates(center, candidates, options, flags)?;

        tracing::debug!(
            "Nearby search at ({}, {}) r={}mi: {} candidates, {} in range, {} returned",
            center.latitude,
            center.longitude,
            options.radius,
            candidate_count,
            page.total_matched,
            page.results.len()
        );

        Ok(page)
    }

    /// Resolve a zip code, then search around it
    pub async fn search_by_zip_code(
        &self,
        zip_code: &str,
        country: Option<&str>,
        options: &SearchOptions,
        flags: SearchFlags,
    ) -> Result<SearchPage, GeoError> {
        let center = self.resolve_location(&LocationInput::ZipCode {
            zip_code: zip_code.to_string(),
            country: country.map(str::to_string),
        })
        .await?;

        self.search_nearby(&center, options, flags).await
    }

    /// Resolve a street address, then search around it
    pub async fn search_by_address(
        &self,
        address: &str,
        options: &SearchOptions,
        flags: SearchFlags,
    ) -> Result<SearchPage, GeoError> {
        let center = self
            .resolve_location(&LocationInput::Address {
                address: address.to_string(),
            })
            .await?;

        self.search_nearby(&center, options, flags).await
    }

    /// Turn any caller-supplied location into validated coordinates
    pub async fn resolve_location(&self, input: &LocationInput) -> Result<Coordinates, GeoError> {
        let coords = match input {
            LocationInput::Coordinates(coords) => *coords,
            LocationInput::Address { address } => {
                self.geocoder.geocode_address(address).await.map_err(|e| {
                    tracing::warn!("Failed to geocode address: {}", e);
                    GeoError::from(e)
                })?
            }
            LocationInput::ZipCode { zip_code, country } => self
                .geocoder
                .geocode_zip(zip_code, country.as_deref())
                .await
                .map_err(|e| {
                    tracing::warn!("Failed to geocode zip code {}: {}", zip_code, e);
                    GeoError::from(e)
                })?,
        };

        coords.validate()?;
        Ok(coords)
    }
}
