use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::models::{Address, Coordinates};

/// Errors that can occur when resolving locations
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Geocoding API returned error: {0}")]
    ApiError(String),

    #[error("No results for: {0}")]
    NoResults(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Converts between addresses and coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode_address(&self, address: &str) -> Result<Coordinates, GeocodeError>;

    /// Resolve a postal code, optionally scoped to an ISO country code
    async fn geocode_zip(&self, zip_code: &str, country: Option<&str>) -> Result<Coordinates, GeocodeError>;

    async fn reverse_geocode(&self, coords: &Coordinates) -> Result<Address, GeocodeError>;
}

/// Geocoding client for Nominatim-compatible HTTP APIs
///
/// Requests are made once; retrying is left to the caller.
pub struct HttpGeocoder {
    base_url: String,
    api_key: Option<String>,
    default_country: Option<String>,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<ReverseAddress>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ReverseAddress {
    house_number: Option<String>,
    road: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
    country_code: Option<String>,
}

impl HttpGeocoder {
    /// Create a new geocoding client
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        user_agent: &str,
        timeout_secs: u64,
        default_country: Option<String>,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            default_country,
            client,
        })
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> String {
        let mut query: Vec<String> = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect();
        query.push("format=json".to_string());
        if let Some(key) = &self.api_key {
            query.push(format!("key={}", urlencoding::encode(key)));
        }

        format!(
            "{}/{}?{}",
            self.base_url.trim_end_matches('/'),
            path,
            query.join("&")
        )
    }

    async fn search(&self, label: &str, params: &[(&str, String)]) -> Result<Coordinates, GeocodeError> {
        let url = self.url("search", params);
        tracing::debug!("Geocoding {}", label);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(GeocodeError::ApiError(format!(
                "Search failed for {}: {}",
                label,
                response.status()
            )));
        }

        let hits: Vec<SearchHit> = response
            .json()
            .await
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        let hit = hits
            .first()
            .ok_or_else(|| GeocodeError::NoResults(label.to_string()))?;

        let latitude = parse_degrees(&hit.lat)?;
        let longitude = parse_degrees(&hit.lon)?;

        Coordinates::new(latitude, longitude)
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))
    }
}

fn parse_degrees(value: &str) -> Result<f64, GeocodeError> {
    value
        .parse::<f64>()
        .map_err(|_| GeocodeError::InvalidResponse(format!("Not a coordinate: {}", value)))
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode_address(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(GeocodeError::NoResults("empty address".to_string()));
        }

        self.search(address, &[("q", address.to_string()), ("limit", "1".to_string())])
            .await
    }

    async fn geocode_zip(&self, zip_code: &str, country: Option<&str>) -> Result<Coordinates, GeocodeError> {
        let zip_code = zip_code.trim();
        if zip_code.is_empty() {
            return Err(GeocodeError::NoResults("empty zip code".to_string()));
        }

        let mut params = vec![("postalcode", zip_code.to_string()), ("limit", "1".to_string())];
        if let Some(country) = country.or(self.default_country.as_deref()) {
            params.push(("countrycodes", country.to_lowercase()));
        }

        self.search(zip_code, &params).await
    }

    async fn reverse_geocode(&self, coords: &Coordinates) -> Result<Address, GeocodeError> {
        let url = self.url(
            "reverse",
            &[
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
            ],
        );

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(GeocodeError::ApiError(format!(
                "Reverse geocoding failed: {}",
                response.status()
            )));
        }

        let body: ReverseResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        if let Some(error) = body.error {
            return Err(GeocodeError::NoResults(error));
        }

        let parts = body.address.unwrap_or_default();
        let street = match (parts.house_number, parts.road) {
            (Some(number), Some(road)) => Some(format!("{} {}", number, road)),
            (None, road) => road,
            (Some(number), None) => Some(number),
        };

        Ok(Address {
            street,
            city: parts.city.or(parts.town).or(parts.village),
            state: parts.state,
            postal_code: parts.postcode,
            country: parts.country_code.map(|code| code.to_uppercase()),
            formatted_address: body.display_name.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_client(base_url: String) -> HttpGeocoder {
        HttpGeocoder::new(base_url, None, "biabook-geo-test", 5, Some("US".to_string()))
            .expect("Failed to create geocoder")
    }

    #[tokio::test]
    async fn test_geocode_address() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("q".into(), "350 5th Ave, New York".into()),
                mockito::Matcher::UrlEncoded("format".into(), "json".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"lat": "40.7484", "lon": "-73.9857", "display_name": "Empire State Building"}]"#)
            .create_async()
            .await;

        let geocoder = create_client(server.url());
        let coords = geocoder.geocode_address("350 5th Ave, New York").await.unwrap();

        mock.assert_async().await;
        assert!((coords.latitude - 40.7484).abs() < 1e-9);
        assert!((coords.longitude + 73.9857).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_geocode_zip_uses_default_country() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("postalcode".into(), "10001".into()),
                mockito::Matcher::UrlEncoded("countrycodes".into(), "us".into()),
            ]))
            .with_status(200)
            .with_body(r#"[{"lat": "40.7506", "lon": "-73.9971"}]"#)
            .create_async()
            .await;

        let geocoder = create_client(server.url());
        let coords = geocoder.geocode_zip("10001", None).await.unwrap();

        mock.assert_async().await;
        assert!((coords.latitude - 40.7506).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_empty_results() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let geocoder = create_client(server.url());
        let result = geocoder.geocode_zip("00000", None).await;

        assert!(matches!(result, Err(GeocodeError::NoResults(_))));
    }

    #[tokio::test]
    async fn test_api_error_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let geocoder = create_client(server.url());
        let result = geocoder.geocode_address("Main Street").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(GeocodeError::ApiError(_))));
    }

    #[tokio::test]
    async fn test_reverse_geocode() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/reverse")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{
                    "display_name": "350, 5th Avenue, New York, 10118, United States",
                    "address": {
                        "house_number": "350",
                        "road": "5th Avenue",
                        "city": "New York",
                        "state": "New York",
                        "postcode": "10118",
                        "country_code": "us"
                    }
                }"#,
            )
            .create_async()
            .await;

        let geocoder = create_client(server.url());
        let address = geocoder
            .reverse_geocode(&Coordinates { latitude: 40.7484, longitude: -73.9857 })
            .await
            .unwrap();

        assert_eq!(address.street.as_deref(), Some("350 5th Avenue"));
        assert_eq!(address.postal_code.as_deref(), Some("10118"));
        assert_eq!(address.country.as_deref(), Some("US"));
    }
}
