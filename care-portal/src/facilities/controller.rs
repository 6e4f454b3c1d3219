//! Facility search state machine.
//!
//! ```text
//! Idle | Ready | Failed --search--> Locating --fix--> Querying --results--> Ready
//!                                       |                  |
//!                                       +----error----> Failed <----error---+
//! ```
//!
//! Only one search runs at a time per controller. While one is in flight the
//! invoking control reports itself disabled and further invocations are
//! ignored rather than queued or cancelled.

use super::geolocation::Geolocator;
use super::map::{MapHandle, MapInstance};
use super::places::PlacesService;
use crate::models::facility::{FacilityResult, FACILITY_CATEGORIES};
use crate::models::geo::Coordinate;
use crate::services::metrics;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Label of the search control when it can be pressed.
pub const CONTROL_LABEL_IDLE: &str = "Find Facilities Near Me";
/// Label of the search control while a search is running.
pub const CONTROL_LABEL_BUSY: &str = "Searching...";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SearchState {
    Idle,
    Locating,
    Querying,
    Ready { results: Vec<FacilityResult> },
    Failed { reason: String },
}

impl SearchState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SearchState::Locating | SearchState::Querying)
    }

    pub fn results(&self) -> &[FacilityResult] {
        match self {
            SearchState::Ready { results } => results,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SearchState::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    fn outcome_label(&self) -> &'static str {
        match self {
            SearchState::Idle => "idle",
            SearchState::Locating => "locating",
            SearchState::Querying => "querying",
            SearchState::Ready { .. } => "ready",
            SearchState::Failed { .. } => "failed",
        }
    }
}

/// Read-only view of a controller handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSnapshot {
    #[serde(flatten)]
    pub state: SearchState,
    pub user_location: Option<Coordinate>,
    pub control_disabled: bool,
    pub control_label: &'static str,
}

impl SearchSnapshot {
    pub fn new(state: SearchState, user_location: Option<Coordinate>, map_ready: bool) -> Self {
        let in_flight = state.is_in_flight();
        Self {
            control_disabled: in_flight || !map_ready,
            control_label: if in_flight {
                CONTROL_LABEL_BUSY
            } else {
                CONTROL_LABEL_IDLE
            },
            state,
            user_location,
        }
    }

    pub fn results(&self) -> &[FacilityResult] {
        self.state.results()
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error()
    }
}

/// Why an invocation was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SearchRejected {
    #[error("a facility search is already in progress")]
    AlreadyRunning,

    #[error("the map has not finished loading")]
    MapNotReady,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The search ran to a terminal state.
    Completed(SearchState),
    /// Nothing happened.
    Ignored(SearchRejected),
}

#[derive(Debug)]
struct Inner {
    state: SearchState,
    user_location: Option<Coordinate>,
}

pub struct FacilitySearchController {
    geolocator: Arc<dyn Geolocator>,
    places: Arc<dyn PlacesService>,
    map: Arc<MapHandle>,
    radius_meters: u32,
    search_zoom: u8,
    inner: Mutex<Inner>,
}

impl FacilitySearchController {
    pub fn new(
        geolocator: Arc<dyn Geolocator>,
        places: Arc<dyn PlacesService>,
        map: Arc<MapHandle>,
        radius_meters: u32,
        search_zoom: u8,
    ) -> Self {
        Self {
            geolocator,
            places,
            map,
            radius_meters,
            search_zoom,
            inner: Mutex::new(Inner {
                state: SearchState::Idle,
                user_location: None,
            }),
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn map(&self) -> &Arc<MapHandle> {
        &self.map
    }

    pub fn state(&self) -> SearchState {
        self.inner().state.clone()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        let inner = self.inner();
        SearchSnapshot::new(
            inner.state.clone(),
            inner.user_location,
            self.map.is_ready(),
        )
    }

    /// Record that the page's map script finished loading.
    ///
    /// A page reloaded after a location fix reports a fresh instance at the
    /// default center; it is panned to the known location before it is
    /// stored, so it never undoes the pan made by a search.
    pub fn attach_map(&self, instance: Option<MapInstance>) {
        let inner = self.inner();
        let instance = match (instance, inner.user_location) {
            (Some(mut instance), Some(location)) => {
                instance.pan_to(location);
                instance.set_zoom(self.search_zoom);
                Some(instance)
            }
            (instance, _) => instance,
        };
        self.map.mark_loaded(instance);
    }

    /// Whether the search control should be disabled right now.
    pub fn is_control_disabled(&self) -> bool {
        self.snapshot().control_disabled
    }

    /// Run one complete search invocation.
    pub async fn search(&self) -> SearchOutcome {
        if let Err(rejected) = self.begin() {
            return SearchOutcome::Ignored(rejected);
        }
        SearchOutcome::Completed(self.complete().await)
    }

    /// Enter `Locating`, clearing the previous results and error text.
    ///
    /// The in-flight check and the transition happen under one lock, so of
    /// two racing invocations exactly one is accepted.
    pub fn begin(&self) -> Result<(), SearchRejected> {
        if !self.map.is_ready() {
            tracing::debug!("Facility search ignored: map not ready");
            return Err(SearchRejected::MapNotReady);
        }

        let mut inner = self.inner();
        if inner.state.is_in_flight() {
            tracing::debug!("Facility search ignored: already in progress");
            return Err(SearchRejected::AlreadyRunning);
        }
        inner.state = SearchState::Locating;
        drop(inner);

        tracing::info!("Facility search started");
        Ok(())
    }

    /// Drive an accepted search from `Locating` to a terminal state.
    ///
    /// Must follow a successful [`begin`](Self::begin).
    pub async fn complete(&self) -> SearchState {
        let location = match self.geolocator.acquire().await {
            Ok(location) => location,
            Err(e) => {
                tracing::info!(reason = %e, "Facility search failed to locate visitor");
                return self.finish(SearchState::Failed {
                    reason: e.to_string(),
                });
            }
        };

        {
            let mut inner = self.inner();
            inner.user_location = Some(location);
            inner.state = SearchState::Querying;

            // Under the state lock, so `attach_map` cannot slip an unpanned
            // instance in between.
            if !self.map.pan_to(location, self.search_zoom) {
                tracing::debug!("No live map instance; skipping pan");
            }
        }

        let state = match self
            .places
            .search(location, self.radius_meters, &FACILITY_CATEGORIES)
            .await
        {
            Ok(results) => SearchState::Ready { results },
            Err(e) => {
                tracing::warn!(error = %e, "Nearby facility query failed");
                SearchState::Failed {
                    reason: e.user_message().to_string(),
                }
            }
        };

        self.finish(state)
    }

    fn finish(&self, state: SearchState) -> SearchState {
        self.inner().state = state.clone();

        metrics::record_facility_search(state.outcome_label());
        tracing::info!(
            outcome = state.outcome_label(),
            facilities = state.results().len(),
            "Facility search finished"
        );

        state
    }
}
