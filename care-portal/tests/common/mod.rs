//! Shared test doubles and app construction for care-portal integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use care_portal::facilities::{
    GeolocationError, Geolocator, MapRenderer, MapSettings, PlacesService, QueryError,
};
use care_portal::models::{Coordinate, FacilityCategory, FacilityResult, DEFAULT_CENTER};
use care_portal::services::providers::mock::MockTextProvider;
use care_portal::services::sessions::SessionDefaults;
use care_portal::services::{ChatService, ReportAnalyzer, SessionRegistry};
use care_portal::startup::{build_router, SessionOptions};
use care_portal::AppState;
use secrecy::Secret;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Geolocator that answers immediately with a fixed outcome.
pub struct StubGeolocator {
    outcome: Result<Coordinate, GeolocationError>,
    pub calls: AtomicUsize,
}

impl StubGeolocator {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self::with(Ok(Coordinate::new(latitude, longitude)))
    }

    pub fn failing(error: GeolocationError) -> Self {
        Self::with(Err(error))
    }

    fn with(outcome: Result<Coordinate, GeolocationError>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Geolocator for StubGeolocator {
    async fn acquire(&self) -> Result<Coordinate, GeolocationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome
    }
}

/// Places service returning canned results, optionally held until released.
pub struct StubPlaces {
    outcome: Result<Vec<FacilityResult>, String>,
    gate: Option<Semaphore>,
    pub calls: AtomicUsize,
    pub last_request: Mutex<Option<(Coordinate, u32, Vec<FacilityCategory>)>>,
}

impl StubPlaces {
    pub fn returning(results: Vec<FacilityResult>) -> Self {
        Self::with(Ok(results), false)
    }

    pub fn failing(status: &str) -> Self {
        Self::with(Err(status.to_string()), false)
    }

    /// Like [`returning`](Self::returning) but each call blocks until
    /// [`release`](Self::release) is called.
    pub fn gated(results: Vec<FacilityResult>) -> Self {
        Self::with(Ok(results), true)
    }

    fn with(outcome: Result<Vec<FacilityResult>, String>, gated: bool) -> Self {
        Self {
            outcome,
            gate: gated.then(|| Semaphore::new(0)),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlacesService for StubPlaces {
    async fn search(
        &self,
        center: Coordinate,
        radius_meters: u32,
        categories: &[FacilityCategory],
    ) -> Result<Vec<FacilityResult>, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some((center, radius_meters, categories.to_vec()));

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        match self.outcome.clone() {
            Ok(results) => Ok(results),
            Err(status) => Err(QueryError::ServiceError(status)),
        }
    }
}

pub fn two_facilities() -> Vec<FacilityResult> {
    vec![
        FacilityResult::new(
            "City Hospital",
            Coordinate::new(22.01, 88.01),
            FacilityCategory::Hospital,
        ),
        FacilityResult::new(
            "Corner Pharmacy",
            Coordinate::new(21.99, 87.99),
            FacilityCategory::Pharmacy,
        ),
    ]
}

pub fn map_settings() -> MapSettings {
    MapSettings {
        api_key: Secret::new("test-maps-key".to_string()),
        default_center: DEFAULT_CENTER,
        zoom: 12,
        search_zoom: 14,
    }
}

pub fn test_state(places: Arc<dyn PlacesService>, provider_enabled: bool) -> AppState {
    let provider = Arc::new(MockTextProvider::new(provider_enabled));
    let registry = Arc::new(SessionRegistry::new(
        places,
        SessionDefaults {
            radius_meters: 5000,
            search_zoom: 14,
            locate_timeout: Duration::from_secs(5),
        },
    ));

    AppState::new(
        registry,
        Arc::new(ChatService::new(provider.clone())),
        Arc::new(ReportAnalyzer::new(provider)),
        Arc::new(MapRenderer::new(map_settings())),
    )
}

pub fn test_app(places: Arc<dyn PlacesService>) -> axum::Router {
    build_router(test_state(places, true), SessionOptions::default())
}
