//! Per-visitor state.
//!
//! Each browser session owns one facility search controller, its map handle
//! and geolocation bridge, and one chat transcript. Nothing here outlives the
//! process.

use super::chat::ChatTranscript;
use crate::facilities::{
    BrowserGeolocator, FacilitySearchController, Geolocator, MapHandle, PlacesService,
};
use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Parameters shared by every new session.
#[derive(Debug, Clone, Copy)]
pub struct SessionDefaults {
    pub radius_meters: u32,
    pub search_zoom: u8,
    pub locate_timeout: Duration,
}

pub struct PortalSession {
    pub id: Uuid,
    pub geolocator: Arc<BrowserGeolocator>,
    pub facilities: Arc<FacilitySearchController>,
    pub chat: ChatTranscript,
    last_active: Mutex<Instant>,
}

impl PortalSession {
    fn new(id: Uuid, places: Arc<dyn PlacesService>, defaults: SessionDefaults) -> Self {
        let geolocator = Arc::new(BrowserGeolocator::new(defaults.locate_timeout));
        let facilities = Arc::new(FacilitySearchController::new(
            geolocator.clone() as Arc<dyn Geolocator>,
            places,
            Arc::new(MapHandle::new()),
            defaults.radius_meters,
            defaults.search_zoom,
        ));

        Self {
            id,
            geolocator,
            facilities,
            chat: ChatTranscript::new(),
            last_active: Mutex::new(Instant::now()),
        }
    }

    pub fn map(&self) -> &Arc<MapHandle> {
        self.facilities.map()
    }

    fn touch(&self) {
        *self
            .last_active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.last_active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .elapsed()
    }
}

pub struct SessionRegistry {
    sessions: DashMap<Uuid, Arc<PortalSession>>,
    places: Arc<dyn PlacesService>,
    defaults: SessionDefaults,
}

impl SessionRegistry {
    pub fn new(places: Arc<dyn PlacesService>, defaults: SessionDefaults) -> Self {
        Self {
            sessions: DashMap::new(),
            places,
            defaults,
        }
    }

    /// Look up the visitor's session, creating it when the id is unknown or
    /// absent, and mark it active.
    pub fn get_or_create(&self, id: Option<Uuid>) -> Arc<PortalSession> {
        let id = id.unwrap_or_else(Uuid::new_v4);
        let session = self
            .sessions
            .entry(id)
            .or_insert_with(|| {
                tracing::debug!(session_id = %id, "Creating portal session");
                Arc::new(PortalSession::new(id, self.places.clone(), self.defaults))
            })
            .clone();
        session.touch();
        session
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop sessions idle longer than `max_idle`. Sessions with a search in
    /// flight are kept. Returns how many were removed.
    pub fn prune_idle(&self, max_idle: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| {
            session.idle_for() <= max_idle || session.facilities.state().is_in_flight()
        });
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            tracing::info!(removed, remaining = self.sessions.len(), "Pruned idle sessions");
        }
        removed
    }

    /// Periodically prune idle sessions in the background.
    pub fn spawn_pruner(self: &Arc<Self>, max_idle: Duration) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        let period = (max_idle / 4).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                registry.prune_idle(max_idle);
            }
        })
    }
}
