//! Map rendering for the facility locator.
//!
//! The map itself is drawn by the Maps JavaScript API in the browser. This
//! module owns what it shows: the center, zoom and marker list derived from
//! the current search, or a loading placeholder until the browser reports
//! that the map script is ready.

use super::controller::SearchSnapshot;
use crate::models::geo::Coordinate;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Title of the marker placed on the visitor's own position.
pub const USER_MARKER_TITLE: &str = "Your Location";

#[derive(Debug, Clone)]
pub struct MapSettings {
    pub api_key: Secret<String>,
    pub default_center: Coordinate,
    /// Zoom before any search.
    pub zoom: u8,
    /// Zoom applied when the map is panned to the visitor.
    pub search_zoom: u8,
}

/// The browser's live map, as last reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapInstance {
    pub center: Coordinate,
    pub zoom: u8,
}

impl MapInstance {
    pub fn pan_to(&mut self, center: Coordinate) {
        self.center = center;
    }

    pub fn set_zoom(&mut self, zoom: u8) {
        self.zoom = zoom;
    }
}

/// Per-visitor map capability: script readiness plus an optional instance.
#[derive(Debug, Default)]
pub struct MapHandle {
    loaded: AtomicBool,
    instance: Mutex<Option<MapInstance>>,
}

impl MapHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn instance_slot(&self) -> MutexGuard<'_, Option<MapInstance>> {
        self.instance
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_ready(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Record that the map script finished loading, with the instance it
    /// created if the page exposed one.
    pub fn mark_loaded(&self, instance: Option<MapInstance>) {
        if let Some(instance) = instance {
            *self.instance_slot() = Some(instance);
        }
        self.loaded.store(true, Ordering::Release);
    }

    /// Forget readiness and the instance. A freshly served page has to load
    /// the map script again before it can be searched or drawn.
    pub fn reset(&self) {
        self.loaded.store(false, Ordering::Release);
        *self.instance_slot() = None;
    }

    pub fn instance(&self) -> Option<MapInstance> {
        *self.instance_slot()
    }

    /// Pan and zoom the live instance. Returns `false` when there is none.
    pub fn pan_to(&self, center: Coordinate, zoom: u8) -> bool {
        match self.instance_slot().as_mut() {
            Some(instance) => {
                instance.pan_to(center);
                instance.set_zoom(zoom);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    User,
    Facility,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: Coordinate,
    pub title: String,
    pub kind: MarkerKind,
}

/// What the page should draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MapView {
    /// Map script not ready; show a placeholder.
    Loading,
    Ready {
        center: Coordinate,
        zoom: u8,
        markers: Vec<Marker>,
    },
}

impl MapView {
    pub fn markers(&self) -> &[Marker] {
        match self {
            MapView::Loading => &[],
            MapView::Ready { markers, .. } => markers,
        }
    }
}

pub struct MapRenderer {
    settings: MapSettings,
}

impl MapRenderer {
    pub fn new(settings: MapSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &MapSettings {
        &self.settings
    }

    /// Key for the browser's Maps JavaScript API script tag.
    pub fn script_api_key(&self) -> &str {
        self.settings.api_key.expose_secret()
    }

    /// Instance the page creates before anything is known about the visitor.
    pub fn initial_instance(&self) -> MapInstance {
        MapInstance {
            center: self.settings.default_center,
            zoom: self.settings.zoom,
        }
    }

    /// Derive the map view from the current search snapshot.
    ///
    /// Center preference: the live instance (already panned by a search),
    /// then the visitor's position, then the default center. The visitor's
    /// marker precedes facility markers, which keep result order.
    pub fn render(&self, map: &MapHandle, snapshot: &SearchSnapshot) -> MapView {
        if !map.is_ready() {
            return MapView::Loading;
        }

        let (center, zoom) = match (map.instance(), snapshot.user_location) {
            (Some(instance), _) => (instance.center, instance.zoom),
            (None, Some(location)) => (location, self.settings.search_zoom),
            (None, None) => (self.settings.default_center, self.settings.zoom),
        };

        let mut markers = Vec::with_capacity(snapshot.results().len() + 1);
        if let Some(location) = snapshot.user_location {
            markers.push(Marker {
                position: location,
                title: USER_MARKER_TITLE.to_string(),
                kind: MarkerKind::User,
            });
        }
        markers.extend(snapshot.results().iter().map(|facility| Marker {
            position: facility.location,
            title: facility.name.clone(),
            kind: MarkerKind::Facility,
        }));

        MapView::Ready {
            center,
            zoom,
            markers,
        }
    }
}
