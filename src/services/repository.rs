use async_trait::async_trait;
use std::sync::RwLock;
use thiserror::Error;
use uuid::Uuid;

use crate::core::filters::matches_candidate_filter;
use crate::models::{Business, CandidateFilter};

/// Errors raised by business/location storage
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// Read access to businesses and their locations
///
/// Missing records come back as `Ok(None)`; implementations never invent a
/// placeholder business.
#[async_trait]
pub trait BusinessRepository: Send + Sync {
    /// Active businesses matching the filter, in a stable order
    async fn find_all(&self, filter: &CandidateFilter) -> Result<Vec<Business>, RepositoryError>;

    /// A business with its locations; services are not loaded
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Business>, RepositoryError>;

    /// A business with its locations and active services
    async fn find_by_id_with_services(&self, id: Uuid) -> Result<Option<Business>, RepositoryError>;

    async fn health_check(&self) -> Result<bool, RepositoryError> {
        Ok(true)
    }
}

/// Repository backed by a vector, in insertion order
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    businesses: RwLock<Vec<Business>>,
}

impl InMemoryRepository {
    pub fn new(businesses: Vec<Business>) -> Self {
        Self {
            businesses: RwLock::new(businesses),
        }
    }

    pub fn insert(&self, business: Business) {
        self.write().push(business);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Business>> {
        self.businesses.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Business>> {
        self.businesses.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn prepare(mut business: Business, include_services: bool) -> Business {
    business.starting_price = business.lowest_service_price();
    if include_services {
        business.services.retain(|service| service.is_active);
    } else {
        business.services.clear();
    }
    business
}

#[async_trait]
impl BusinessRepository for InMemoryRepository {
    async fn find_all(&self, filter: &CandidateFilter) -> Result<Vec<Business>, RepositoryError> {
        Ok(self
            .read()
            .iter()
            .filter(|business| matches_candidate_filter(business, filter))
            .cloned()
            .map(|business| prepare(business, filter.include_services))
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Business>, RepositoryError> {
        Ok(self
            .read()
            .iter()
            .find(|business| business.id == id)
            .cloned()
            .map(|business| prepare(business, false)))
    }

    async fn find_by_id_with_services(&self, id: Uuid) -> Result<Option<Business>, RepositoryError> {
        Ok(self
            .read()
            .iter()
            .find(|business| business.id == id)
            .cloned()
            .map(|business| prepare(business, true)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BusinessLocation, Coordinates, Service};

    fn create_business(name: &str, is_active: bool, prices: &[f64]) -> Business {
        let id = Uuid::new_v4();
        Business {
            id,
            name: name.to_string(),
            category_id: None,
            rating: None,
            starting_price: None,
            is_active,
            locations: vec![BusinessLocation {
                id: Uuid::new_v4(),
                business_id: id,
                coordinates: Coordinates { latitude: 40.7, longitude: -74.0 },
                service_radius: None,
                timezone: "America/New_York".to_string(),
                is_primary: true,
                address: None,
            }],
            services: prices
                .iter()
                .map(|price| Service {
                    id: Uuid::new_v4(),
                    name: format!("Service {}", price),
                    price: *price,
                    duration_minutes: 30,
                    is_active: true,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_find_all_skips_inactive() {
        let repo = InMemoryRepository::new(vec![
            create_business("open", true, &[]),
            create_business("closed", false, &[]),
        ]);

        let found = repo.find_all(&CandidateFilter::default()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "open");
    }

    #[tokio::test]
    async fn test_services_loaded_on_request() {
        let business = create_business("salon", true, &[40.0, 25.0]);
        let id = business.id;
        let repo = InMemoryRepository::new(vec![business]);

        let plain = repo.find_by_id(id).await.unwrap().unwrap();
        assert!(plain.services.is_empty());
        assert_eq!(plain.starting_price, Some(25.0));

        let full = repo.find_by_id_with_services(id).await.unwrap().unwrap();
        assert_eq!(full.services.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_business_is_none() {
        let repo = InMemoryRepository::default();
        assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }
}
