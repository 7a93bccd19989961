use uuid::Uuid;

use crate::core::{
    distance::{calculate_distance, with_travel_time},
    filters::{validate_radius, within_service_radius},
};
use crate::error::GeoError;
use crate::models::{BookingLocationValidation, Coordinates, SearchFlags, SearchOptions, ValidationOptions};

use super::matcher::ProximityMatcher;

impl ProximityMatcher {
    /// Check whether a business serves a customer's location
    ///
    /// Distance is measured from the business's primary location. When the
    /// location is out of range and alternatives are requested, nearby
    /// businesses that do serve it are suggested, nearest first.
    pub async fn validate_booking_location(
        &self,
        business_id: Uuid,
        customer_location: &Coordinates,
        options: ValidationOptions,
    ) -> Result<BookingLocationValidation, GeoError> {
        customer_location.validate()?;
        if options.include_alternatives {
            validate_radius(options.max_alternative_radius)?;
        }

        let business = self
            .repository
            .find_by_id_with_services(business_id)
            .await?
            .ok_or_else(|| GeoError::BusinessNotFound(business_id.to_string()))?;

        let location = business.primary_location().ok_or_else(|| {
            GeoError::BusinessNotFound(format!("{} has no location on record", business_id))
        })?;

        let distance = calculate_distance(customer_location, &location.coordinates);
        let is_valid = within_service_radius(distance, location.service_radius);
        let measured = with_travel_time(distance);

        let alternatives = if !is_valid && options.include_alternatives {
            self.find_alternatives(business_id, customer_location, options).await?
        } else {
            Vec::new()
        };

        tracing::debug!(
            "Booking location for {} is {} ({}mi, radius {:?}, {} alternatives)",
            business.name,
            if is_valid { "valid" } else { "out of range" },
            measured.distance,
            location.service_radius,
            alternatives.len()
        );

        Ok(BookingLocationValidation {
            is_valid,
            distance: measured.distance,
            estimated_travel_time: measured.estimated_travel_time,
            business_name: business.name.clone(),
            service_radius: location.service_radius,
            alternatives,
        })
    }

    async fn find_alternatives(
        &self,
        exclude_id: Uuid,
        customer_location: &Coordinates,
        options: ValidationOptions,
    ) -> Result<Vec<crate::models::SearchResult>, GeoError> {
        if options.max_alternatives == 0 {
            return Ok(Vec::new());
        }

        let search = SearchOptions {
            radius: options.max_alternative_radius,
            // One extra slot in case the original business is in the page
            limit: options.max_alternatives.saturating_add(1),
            ..Default::default()
        };
        let flags = SearchFlags {
            include_services: false,
            validate_service_radius: true,
        };

        let page = self.search_nearby(customer_location, &search, flags).await?;

        Ok(page
            .results
            .into_iter()
            .filter(|result| result.business.id != exclude_id)
            .take(options.max_alternatives)
            .collect())
    }
}
