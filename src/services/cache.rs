use async_trait::async_trait;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::geocoding::{GeocodeError, Geocoder};
use crate::models::{Address, Coordinates};

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// Two-tier cache for geocoding lookups
///
/// L1 is an in-process moka cache; L2 is Redis, shared across instances and
/// optional. Without Redis the manager serves from L1 only.
pub struct CacheManager {
    redis: Option<Arc<tokio::sync::Mutex<ConnectionManager>>>,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
}

impl CacheManager {
    /// Create a cache manager backed by Redis
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Some(Arc::new(tokio::sync::Mutex::new(redis))),
            ..Self::in_memory(l1_size, ttl_secs)
        })
    }

    /// Create an L1-only cache manager
    pub fn in_memory(l1_size: u64, ttl_secs: u64) -> Self {
        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            redis: None,
            l1_cache,
            ttl_secs,
        }
    }

    /// Get a value from cache (L1 first, then L2)
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(serde_json::from_slice(&bytes)?);
        }

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            let value: Option<String> = redis::cmd("GET")
                .arg(key)
                .query_async(&mut *conn)
                .await?;
            drop(conn);

            if let Some(json) = value {
                tracing::trace!("L2 cache hit: {}", key);

                self.l1_cache.insert(key.to_string(), json.as_bytes().to_vec()).await;

                return Ok(serde_json::from_str(&json)?);
            }
        }

        tracing::trace!("Cache miss: {}", key);
        Err(CacheError::CacheMiss(key.to_string()))
    }

    /// Set a value in cache (both tiers)
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;

        self.l1_cache.insert(key.to_string(), json.as_bytes().to_vec()).await;

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            redis::cmd("SETEX")
                .arg(key)
                .arg(self.ttl_secs)
                .arg(json)
                .query_async::<()>(&mut *conn)
                .await?;
        }

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Delete a value from both cache tiers
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.l1_cache.invalidate(key).await;
        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            redis::cmd("DEL")
                .arg(key)
                .query_async::<()>(&mut *conn)
                .await?;
        }
        Ok(())
    }

    pub fn has_redis(&self) -> bool {
        self.redis.is_some()
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a free-form address
    pub fn address(address: &str) -> String {
        format!("geocode:address:{}", normalize(address))
    }

    /// Build a cache key for a postal code lookup
    pub fn zip(zip_code: &str, country: Option<&str>) -> String {
        format!(
            "geocode:zip:{}:{}",
            country.map(normalize).unwrap_or_default(),
            normalize(zip_code)
        )
    }

    /// Build a cache key for reverse geocoding, at ~1m precision
    pub fn reverse(coords: &Coordinates) -> String {
        format!("geocode:reverse:{:.5}:{:.5}", coords.latitude, coords.longitude)
    }
}

fn normalize(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Geocoder decorator that memoizes successful lookups
///
/// Failures are never cached, and cache errors fall through to the inner
/// geocoder.
pub struct CachedGeocoder<G> {
    inner: G,
    cache: Arc<CacheManager>,
}

impl<G: Geocoder> CachedGeocoder<G> {
    pub fn new(inner: G, cache: Arc<CacheManager>) -> Self {
        Self { inner, cache }
    }

    async fn remember<T>(&self, key: &str, value: &T)
    where
        T: Serialize + Sync,
    {
        if let Err(e) = self.cache.set(key, value).await {
            tracing::warn!("Failed to cache {}: {}", key, e);
        }
    }

    async fn lookup<T>(&self, key: &str) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        match self.cache.get(key).await {
            Ok(value) => Some(value),
            Err(CacheError::CacheMiss(_)) => None,
            Err(e) => {
                tracing::warn!("Cache read failed for {}: {}", key, e);
                None
            }
        }
    }
}

#[async_trait]
impl<G: Geocoder> Geocoder for CachedGeocoder<G> {
    async fn geocode_address(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        let key = CacheKey::address(address);
        if let Some(coords) = self.lookup(&key).await {
            return Ok(coords);
        }

        let coords = self.inner.geocode_address(address).await?;
        self.remember(&key, &coords).await;
        Ok(coords)
    }

    async fn geocode_zip(&self, zip_code: &str, country: Option<&str>) -> Result<Coordinates, GeocodeError> {
        let key = CacheKey::zip(zip_code, country);
        if let Some(coords) = self.lookup(&key).await {
            return Ok(coords);
        }

        let coords = self.inner.geocode_zip(zip_code, country).await?;
        self.remember(&key, &coords).await;
        Ok(coords)
    }

    async fn reverse_geocode(&self, coords: &Coordinates) -> Result<Address, GeocodeError> {
        let key = CacheKey::reverse(coords);
        if let Some(address) = self.lookup(&key).await {
            return Ok(address);
        }

        let address = self.inner.reverse_geocode(coords).await?;
        self.remember(&key, &address).await;
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingGeocoder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Geocoder for CountingGeocoder {
        async fn geocode_address(&self, address: &str) -> Result<Coordinates, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if address.contains("nowhere") {
                return Err(GeocodeError::NoResults(address.to_string()));
            }
            Ok(Coordinates { latitude: 40.0, longitude: -75.0 })
        }

        async fn geocode_zip(&self, _zip_code: &str, _country: Option<&str>) -> Result<Coordinates, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Coordinates { latitude: 41.0, longitude: -73.0 })
        }

        async fn reverse_geocode(&self, _coords: &Coordinates) -> Result<Address, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Address::default())
        }
    }

    fn create_cached() -> CachedGeocoder<CountingGeocoder> {
        CachedGeocoder::new(
            CountingGeocoder { calls: AtomicUsize::new(0) },
            Arc::new(CacheManager::in_memory(100, 60)),
        )
    }

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_cache_set_get() {
        let cache = CacheManager::new("redis://127.0.0.1:6379", 1000, 60)
            .await
            .expect("Failed to create cache");

        cache.set("test_key", &"test_value").await.unwrap();
        let result: String = cache.get("test_key").await.unwrap();
        assert_eq!(result, "test_value");

        cache.delete("test_key").await.unwrap();
        assert!(cache.get::<String>("test_key").await.is_err());
    }

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let cache = CacheManager::in_memory(10, 60);
        assert!(!cache.has_redis());

        cache.set("k", &42u32).await.unwrap();
        assert_eq!(cache.get::<u32>("k").await.unwrap(), 42);

        cache.delete("k").await.unwrap();
        assert!(matches!(cache.get::<u32>("k").await, Err(CacheError::CacheMiss(_))));
    }

    #[tokio::test]
    async fn test_repeated_lookup_hits_cache() {
        let geocoder = create_cached();

        geocoder.geocode_address("1 Main St").await.unwrap();
        geocoder.geocode_address("  1 MAIN st ").await.unwrap();
        geocoder.geocode_zip("10001", Some("US")).await.unwrap();
        geocoder.geocode_zip("10001", Some("us")).await.unwrap();

        assert_eq!(geocoder.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_not_cached() {
        let geocoder = create_cached();

        assert!(geocoder.geocode_address("nowhere").await.is_err());
        assert!(geocoder.geocode_address("nowhere").await.is_err());

        assert_eq!(geocoder.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cache_key_builder() {
        assert_eq!(CacheKey::address(" 1  Main St "), "geocode:address:1 main st");
        assert_eq!(CacheKey::zip("10001", Some("US")), "geocode:zip:us:10001");
        assert_eq!(CacheKey::zip("10001", None), "geocode:zip::10001");
        assert_eq!(
            CacheKey::reverse(&Coordinates { latitude: 40.0, longitude: -75.0 }),
            "geocode:reverse:40.00000:-75.00000"
        );
    }
}
