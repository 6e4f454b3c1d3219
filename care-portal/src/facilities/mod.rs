//! Nearby healthcare facility search.
//!
//! The flow is geolocation, then a nearby-places query, then map rendering,
//! driven by [`controller::FacilitySearchController`]. Both external steps
//! sit behind traits so the controller never sees callbacks or HTTP.

pub mod controller;
pub mod geolocation;
pub mod map;
pub mod places;

pub use controller::{
    FacilitySearchController, SearchOutcome, SearchRejected, SearchSnapshot, SearchState,
};
pub use geolocation::{BrowserGeolocator, GeolocationError, Geolocator, LocationReport};
pub use map::{MapHandle, MapInstance, MapRenderer, MapSettings, MapView, Marker};
pub use places::{GooglePlacesClient, PlacesService, QueryError, SEARCH_RADIUS_METERS};
