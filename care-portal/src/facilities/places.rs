//! Nearby-search adapter over the Google Places web service.

use crate::models::facility::{FacilityCategory, FacilityResult};
use crate::models::geo::Coordinate;
use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

/// Radius of every facility search.
pub const SEARCH_RADIUS_METERS: u32 = 5000;

/// Nearby Search path relative to the Maps Platform host.
const NEARBY_SEARCH_PATH: &str = "/maps/api/place/nearbysearch/json";

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("places service error: {0}")]
    ServiceError(String),
}

impl QueryError {
    /// Text shown to the visitor in place of the technical detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            QueryError::ServiceError(_) => {
                "Could not search for nearby facilities. Please try again later."
            }
        }
    }
}

/// Points of interest around a coordinate.
#[async_trait]
pub trait PlacesService: Send + Sync {
    /// Return facilities within `radius_meters` of `center` matching any of
    /// `categories`, in the order the service returned them. An empty list
    /// is a successful answer.
    async fn search(
        &self,
        center: Coordinate,
        radius_meters: u32,
        categories: &[FacilityCategory],
    ) -> Result<Vec<FacilityResult>, QueryError>;
}

/// Google Places client configuration.
#[derive(Debug, Clone)]
pub struct PlacesConfig {
    pub api_key: Secret<String>,
    /// Scheme and host, e.g. `https://maps.googleapis.com`.
    pub base_url: String,
    pub timeout: Duration,
}

/// [`PlacesService`] backed by the legacy Places Nearby Search endpoint.
///
/// That endpoint filters on a single `type`, so each category becomes its
/// own request. Requests run concurrently; results are concatenated in
/// category order and a place already listed under an earlier category is
/// not repeated.
pub struct GooglePlacesClient {
    config: PlacesConfig,
    client: Client,
}

impl GooglePlacesClient {
    pub fn new(config: PlacesConfig) -> Result<Self, QueryError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| QueryError::ServiceError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            NEARBY_SEARCH_PATH
        )
    }

    async fn search_category(
        &self,
        center: Coordinate,
        radius_meters: u32,
        category: FacilityCategory,
    ) -> Result<Vec<FacilityResult>, QueryError> {
        let response = self
            .client
            .get(self.endpoint())
            .query(&[
                ("location", center.to_query_value()),
                ("radius", radius_meters.to_string()),
                ("type", category.as_str().to_string()),
                ("key", self.config.api_key.expose_secret().clone()),
            ])
            .send()
            .await
            .map_err(|e| QueryError::ServiceError(e.without_url().to_string()))?;

        if !response.status().is_success() {
            return Err(QueryError::ServiceError(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: NearbySearchResponse = response
            .json()
            .await
            .map_err(|e| QueryError::ServiceError(format!("failed to parse response: {}", e)))?;

        match body.status.as_str() {
            "OK" => Ok(parse_places(body.results, category)),
            "ZERO_RESULTS" => Ok(Vec::new()),
            status => Err(QueryError::ServiceError(match body.error_message {
                Some(message) => format!("{}: {}", status, message),
                None => status.to_string(),
            })),
        }
    }
}

#[async_trait]
impl PlacesService for GooglePlacesClient {
    async fn search(
        &self,
        center: Coordinate,
        radius_meters: u32,
        categories: &[FacilityCategory],
    ) -> Result<Vec<FacilityResult>, QueryError> {
        tracing::debug!(
            %center,
            radius_meters,
            categories = categories.len(),
            "Querying nearby places"
        );

        let per_category = try_join_all(
            categories
                .iter()
                .map(|category| self.search_category(center, radius_meters, *category)),
        )
        .await?;

        Ok(merge_results(per_category))
    }
}

/// Decode each place on its own; an entry missing its name or geometry is
/// dropped rather than failing the category.
fn parse_places(raw: Vec<serde_json::Value>, category: FacilityCategory) -> Vec<FacilityResult> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<Place>(value) {
            Ok(place) => Some(place.into_facility(category)),
            Err(e) => {
                tracing::debug!(%category, error = %e, "Skipping malformed place");
                None
            }
        })
        .collect()
}

/// Flatten per-category lists, keeping the first occurrence of each place.
fn merge_results(per_category: Vec<Vec<FacilityResult>>) -> Vec<FacilityResult> {
    let mut seen = HashSet::new();
    per_category
        .into_iter()
        .flatten()
        .filter(|facility| match &facility.place_id {
            Some(id) => seen.insert(id.clone()),
            None => true,
        })
        .collect()
}

// ============================================================================
// Places API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<serde_json::Value>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Place {
    name: String,
    geometry: Geometry,
    #[serde(default)]
    place_id: Option<String>,
    #[serde(default)]
    vicinity: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Coordinate,
}

impl Place {
    fn into_facility(self, category: FacilityCategory) -> FacilityResult {
        FacilityResult {
            name: self.name,
            location: self.geometry.location,
            category,
            place_id: self.place_id,
            vicinity: self.vicinity,
        }
    }
}
