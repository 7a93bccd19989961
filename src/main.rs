use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use biabook_geo::config::Settings;
use biabook_geo::core::LongitudeTimezoneDetector;
use biabook_geo::routes::{self, AppState};
use biabook_geo::services::{CacheManager, CachedGeocoder, HttpGeocoder, PostgresClient};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    // Initialize logging; LOG_LEVEL / LOG_FORMAT win over the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting BiaBook geo service...");

    // Initialize PostgreSQL repository
    let repository = PostgresClient::from_settings(&settings.database)
        .await
        .map_err(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string())
        })?;

    info!("PostgreSQL repository initialized");

    // Initialize geocoding cache (Redis is optional)
    let cache = match settings.cache.redis_url.as_deref() {
        Some(url) => match CacheManager::new(url, settings.cache.l1_cache_size, settings.cache.ttl_secs).await {
            Ok(cache) => {
                info!("Geocoding cache initialized with Redis (L1: {} entries)", settings.cache.l1_cache_size);
                cache
            }
            Err(e) => {
                warn!("Failed to connect to Redis ({}), caching geocodes in-process only", e);
                CacheManager::in_memory(settings.cache.l1_cache_size, settings.cache.ttl_secs)
            }
        },
        None => CacheManager::in_memory(settings.cache.l1_cache_size, settings.cache.ttl_secs),
    };

    let geocoding = &settings.geocoding;
    let http_geocoder = HttpGeocoder::new(
        geocoding.base_url.clone(),
        geocoding.api_key.clone(),
        &geocoding.user_agent,
        geocoding.timeout_secs,
        geocoding.default_country.clone(),
    )
    .map_err(|e| {
        error!("Failed to create geocoding client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    info!("Geocoding client initialized for {}", geocoding.base_url);

    let app_state = AppState::new(
        Arc::new(repository),
        Arc::new(CachedGeocoder::new(http_geocoder, Arc::new(cache))),
        Arc::new(LongitudeTimezoneDetector),
        settings.search,
    );

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(routes::handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
