use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

use super::repository::{BusinessRepository, RepositoryError};
use crate::models::{Business, BusinessLocation, CandidateFilter, Coordinates, Service};

/// PostgreSQL-backed business/location repository
///
/// Search queries use the bounding box from the candidate filter as an
/// indexed range predicate; exact distance filtering happens in the core.
pub struct PostgresClient {
    pool: PgPool,
}

const BUSINESS_LOCATION_COLUMNS: &str = r#"
    b.id AS business_id,
    b.name,
    b.category_id,
    b.rating,
    b.is_active,
    (SELECT MIN(s.price) FROM services s
        WHERE s.business_id = b.id AND s.is_active) AS starting_price,
    l.id AS location_id,
    l.latitude,
    l.longitude,
    l.service_radius,
    l.timezone,
    l.is_primary,
    l.address
"#;

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout_secs: u64,
        idle_timeout_secs: u64,
    ) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(idle_timeout_secs))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        settings: &crate::config::DatabaseSettings,
    ) -> Result<Self, RepositoryError> {
        tracing::info!("Connecting to PostgreSQL (max {} connections)", settings.max_connections);

        Self::new(
            &settings.url,
            settings.max_connections,
            settings.min_connections,
            settings.acquire_timeout_secs,
            settings.idle_timeout_secs,
        )
        .await
    }

    async fn load_services(&self, business_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Service>>, RepositoryError> {
        if business_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let query = r#"
            SELECT id, business_id, name, price, duration_minutes, is_active
            FROM services
            WHERE business_id = ANY($1) AND is_active
            ORDER BY price ASC, name ASC
        "#;

        let rows = sqlx::query(query)
            .bind(business_ids)
            .fetch_all(&self.pool)
            .await?;

        let mut services: HashMap<Uuid, Vec<Service>> = HashMap::new();
        for row in &rows {
            let duration: i32 = row.try_get("duration_minutes")?;
            let service = Service {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                price: row.try_get("price")?,
                duration_minutes: u32::try_from(duration).map_err(|_| {
                    RepositoryError::InvalidRecord(format!("negative duration: {}", duration))
                })?,
                is_active: row.try_get("is_active")?,
            };
            services
                .entry(row.try_get("business_id")?)
                .or_default()
                .push(service);
        }

        Ok(services)
    }

    /// Businesses without any location row read as absent
    async fn fetch_one_business(&self, id: Uuid, with_services: bool) -> Result<Option<Business>, RepositoryError> {
        let query = format!(
            r#"
            SELECT {}
            FROM businesses b
            JOIN business_locations l ON l.business_id = b.id
            WHERE b.id = $1
            ORDER BY l.is_primary DESC, l.created_at ASC, l.id ASC
            "#,
            BUSINESS_LOCATION_COLUMNS
        );

        let rows = sqlx::query(&query).bind(id).fetch_all(&self.pool).await?;

        let mut businesses = group_rows(&rows)?;
        if with_services {
            let mut services = self.load_services(&[id]).await?;
            for business in &mut businesses {
                business.services = services.remove(&business.id).unwrap_or_default();
            }
        }

        Ok(businesses.into_iter().next())
    }
}

/// Fold joined business/location rows into businesses, keeping row order
fn group_rows(rows: &[PgRow]) -> Result<Vec<Business>, RepositoryError> {
    let mut businesses: Vec<Business> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for row in rows {
        let business_id: Uuid = row.try_get("business_id")?;

        let location = BusinessLocation {
            id: row.try_get("location_id")?,
            business_id,
            coordinates: Coordinates {
                latitude: row.try_get("latitude")?,
                longitude: row.try_get("longitude")?,
            },
            service_radius: row.try_get("service_radius")?,
            timezone: row.try_get("timezone")?,
            is_primary: row.try_get("is_primary")?,
            address: row.try_get("address")?,
        };

        match index.get(&business_id) {
            Some(&position) => businesses[position].locations.push(location),
            None => {
                index.insert(business_id, businesses.len());
                businesses.push(Business {
                    id: business_id,
                    name: row.try_get("name")?,
                    category_id: row.try_get("category_id")?,
                    rating: row.try_get("rating")?,
                    starting_price: row.try_get("starting_price")?,
                    is_active: row.try_get("is_active")?,
                    locations: vec![location],
                    services: Vec::new(),
                });
            }
        }
    }

    Ok(businesses)
}

#[async_trait]
impl BusinessRepository for PostgresClient {
    async fn find_all(&self, filter: &CandidateFilter) -> Result<Vec<Business>, RepositoryError> {
        let query = format!(
            r#"
            SELECT {}
            FROM businesses b
            JOIN business_locations l ON l.business_id = b.id
            WHERE b.is_active
              AND ($1::uuid IS NULL OR b.category_id = $1)
              AND ($2::float8 IS NULL OR l.latitude BETWEEN $2 AND $3)
              AND ($4::float8 IS NULL OR l.longitude BETWEEN $4 AND $5
                   OR l.longitude + 360 BETWEEN $4 AND $5
                   OR l.longitude - 360 BETWEEN $4 AND $5)
            ORDER BY b.created_at ASC, b.id ASC, l.is_primary DESC, l.created_at ASC
            "#,
            BUSINESS_LOCATION_COLUMNS
        );

        let bbox = filter.bounding_box;
        let rows = sqlx::query(&query)
            .bind(filter.category_id)
            .bind(bbox.map(|b| b.south))
            .bind(bbox.map(|b| b.north))
            .bind(bbox.map(|b| b.west))
            .bind(bbox.map(|b| b.east))
            .fetch_all(&self.pool)
            .await?;

        let mut businesses = group_rows(&rows)?;

        if filter.include_services {
            let ids: Vec<Uuid> = businesses.iter().map(|b| b.id).collect();
            let mut services = self.load_services(&ids).await?;
            for business in &mut businesses {
                business.services = services.remove(&business.id).unwrap_or_default();
            }
        }

        tracing::debug!("Loaded {} candidate businesses", businesses.len());

        Ok(businesses)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Business>, RepositoryError> {
        self.fetch_one_business(id, false).await
    }

    async fn find_by_id_with_services(&self, id: Uuid) -> Result<Option<Business>, RepositoryError> {
        self.fetch_one_business(id, true).await
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, RepositoryError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
