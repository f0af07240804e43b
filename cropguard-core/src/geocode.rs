//! Reverse geocoding: coordinates to a human-readable place name.
//!
//! This layer deliberately never fails. Any transport error, bad
//! payload or empty result degrades to a generic label so the rest of
//! the cycle can carry on.

use reqwest::Client;
use serde::Deserialize;

use crate::model::Coordinate;

/// Label used when the service cannot be reached or talks nonsense.
pub const FALLBACK_PLACE: &str = "Your Location";
/// Label used when the service answers but knows nothing about the spot.
pub const UNKNOWN_PLACE: &str = "Unknown Location";

#[derive(Debug, Deserialize)]
struct GeoPlace {
    name: Option<String>,
    locality: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReverseGeocoder {
    http: Client,
    base_url: String,
    api_key: String,
}

impl ReverseGeocoder {
    pub fn new(http: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Resolve a coordinate to a display name, best-effort.
    ///
    /// Takes the first candidate and prefers `name` over `locality`
    /// over `country`.
    pub async fn resolve_name(&self, coord: &Coordinate) -> String {
        let url = format!("{}/geo/1.0/reverse", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", coord.latitude().to_string()),
                ("lon", coord.longitude().to_string()),
                ("limit", "1".to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await;

        let res = match res {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Reverse geocode request failed: {e}");
                return FALLBACK_PLACE.to_string();
            }
        };

        if !res.status().is_success() {
            tracing::warn!("Reverse geocode returned status {}", res.status());
            return FALLBACK_PLACE.to_string();
        }

        let places: Vec<GeoPlace> = match res.json().await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("Reverse geocode parse error: {e}");
                return FALLBACK_PLACE.to_string();
            }
        };

        let Some(first) = places.into_iter().next() else {
            tracing::debug!("Reverse geocode found no place for {coord}");
            return UNKNOWN_PLACE.to_string();
        };

        let name = first
            .name
            .or(first.locality)
            .or(first.country)
            .unwrap_or_else(|| UNKNOWN_PLACE.to_string());

        tracing::debug!("Reverse geocoded {coord} to {name}");
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn coord() -> Coordinate {
        Coordinate::new(-1.2921, 36.8219).expect("valid coordinate")
    }

    fn geocoder(server: &MockServer) -> ReverseGeocoder {
        ReverseGeocoder::new(Client::new(), server.uri(), "test-key")
    }

    #[tokio::test]
    async fn resolves_first_candidate_name() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geo/1.0/reverse"))
            .and(query_param("limit", "1"))
            .and(query_param("appid", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"name": "Nairobi", "country": "KE"},
                {"name": "Kiambu", "country": "KE"}
            ])))
            .mount(&server)
            .await;

        assert_eq!(geocoder(&server).resolve_name(&coord()).await, "Nairobi");
    }

    #[tokio::test]
    async fn falls_through_name_locality_country() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geo/1.0/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"locality": "Westlands", "country": "KE"}
            ])))
            .mount(&server)
            .await;

        assert_eq!(geocoder(&server).resolve_name(&coord()).await, "Westlands");
    }

    #[tokio::test]
    async fn candidate_with_no_fields_is_unknown() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geo/1.0/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{}])))
            .mount(&server)
            .await;

        assert_eq!(
            geocoder(&server).resolve_name(&coord()).await,
            UNKNOWN_PLACE
        );
    }

    #[tokio::test]
    async fn empty_result_set_is_unknown_location() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geo/1.0/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        assert_eq!(
            geocoder(&server).resolve_name(&coord()).await,
            UNKNOWN_PLACE
        );
    }

    #[tokio::test]
    async fn http_error_degrades_to_fallback_label() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geo/1.0/reverse"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        assert_eq!(
            geocoder(&server).resolve_name(&coord()).await,
            FALLBACK_PLACE
        );
    }

    #[tokio::test]
    async fn malformed_body_degrades_to_fallback_label() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geo/1.0/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        assert_eq!(
            geocoder(&server).resolve_name(&coord()).await,
            FALLBACK_PLACE
        );
    }
}
