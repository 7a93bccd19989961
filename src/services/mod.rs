// Collaborator exports
pub mod cache;
pub mod geocoding;
pub mod postgres;
pub mod repository;

pub use cache::{CacheManager, CacheKey, CacheError, CachedGeocoder};
pub use geocoding::{Geocoder, GeocodeError, HttpGeocoder};
pub use postgres::PostgresClient;
pub use repository::{BusinessRepository, InMemoryRepository, RepositoryError};
