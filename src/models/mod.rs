// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Address, BookingLocationValidation, BoundingBox, Business, BusinessLocation, CandidateFilter,
    Coordinates, DistanceWithTime, LocationInput, SearchFlags, SearchOptions, SearchPage,
    SearchResult, Service, SortBy, ValidationOptions,
};
pub use requests::{
    AddressSearchRequest, DistanceRequest, NearbySearchRequest, ResolveLocationRequest,
    SearchParams, ValidateLocationRequest, ZipSearchRequest,
};
pub use responses::{ErrorResponse, HealthResponse, SearchResponse};
