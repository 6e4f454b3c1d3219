//! Facility locator page and its browser bridge.
//!
//! The page script reports three things back: the map script finished
//! loading (`map-ready`), the visitor pressed the search control (`search`),
//! and the outcome of `getCurrentPosition` (`location`). It then polls the
//! state endpoint until the search reaches a terminal state.

use super::{portal_session, script_json};
use crate::facilities::geolocation::LocationReportError;
use crate::facilities::{LocationReport, MapInstance, MapView, SearchSnapshot};
use crate::models::geo::Coordinate;
use crate::models::navigation::PageKey;
use crate::services::PortalSession;
use crate::AppState;
use askama::Template;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::sync::Arc;
use tower_sessions::Session;

#[derive(Template)]
#[template(path = "facilities.html")]
pub struct FacilitiesTemplate {
    pub back_href: String,
    pub maps_api_key: String,
    pub initial_instance_json: String,
    pub state_json: String,
    pub snapshot: SearchSnapshot,
}

/// Snapshot plus the map view derived from it.
#[derive(Debug, Serialize)]
pub struct FacilitiesResponse {
    #[serde(flatten)]
    pub snapshot: SearchSnapshot,
    pub map: MapView,
}

#[derive(Debug, Default, Deserialize)]
pub struct MapReadyRequest {
    #[serde(default)]
    pub instance: Option<MapInstance>,
}

fn facilities_response(state: &AppState, portal: &PortalSession) -> FacilitiesResponse {
    let snapshot = portal.facilities.snapshot();
    let map = state.renderer.render(portal.map(), &snapshot);
    FacilitiesResponse { snapshot, map }
}

pub async fn facilities_page(
    State(state): State<AppState>,
    session: Session,
) -> Result<FacilitiesTemplate, AppError> {
    let portal = portal_session(&state, &session).await?;
    // This page load brings its own map script; until it reports in, the
    // map is loading and the control stays disabled.
    portal.map().reset();
    let response = facilities_response(&state, &portal);

    Ok(FacilitiesTemplate {
        back_href: PageKey::Home.href(),
        maps_api_key: state.renderer.script_api_key().to_string(),
        initial_instance_json: script_json(&state.renderer.initial_instance())?,
        state_json: script_json(&response)?,
        snapshot: response.snapshot,
    })
}

pub async fn facilities_state(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<FacilitiesResponse>, AppError> {
    let portal = portal_session(&state, &session).await?;
    Ok(Json(facilities_response(&state, &portal)))
}

pub async fn map_ready(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<MapReadyRequest>,
) -> Result<Json<FacilitiesResponse>, AppError> {
    if let Some(instance) = &payload.instance {
        Coordinate::try_new(instance.center.latitude, instance.center.longitude)
            .map_err(|e| AppError::BadRequest(anyhow::Error::new(e)))?;
    }

    let portal = portal_session(&state, &session).await?;
    portal.facilities.attach_map(payload.instance);
    tracing::debug!(
        session_id = %portal.id,
        has_instance = payload.instance.is_some(),
        "Map script ready"
    );

    Ok(Json(facilities_response(&state, &portal)))
}

/// Invoke a search. Answers 202 once the search is `Locating`; the page must
/// then report the browser's position. Answers 409 while another search is
/// in flight or the map is still loading.
pub async fn start_search(
    State(state): State<AppState>,
    session: Session,
) -> Result<(StatusCode, Json<FacilitiesResponse>), AppError> {
    let portal = portal_session(&state, &session).await?;

    portal
        .facilities
        .begin()
        .map_err(|rejected| AppError::Conflict(anyhow::Error::new(rejected)))?;
    portal.geolocator.arm();

    let controller = Arc::clone(&portal.facilities);
    tokio::spawn(async move {
        controller.complete().await;
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(facilities_response(&state, &portal)),
    ))
}

pub async fn report_location(
    State(state): State<AppState>,
    session: Session,
    Json(report): Json<LocationReport>,
) -> Result<Json<FacilitiesResponse>, AppError> {
    let portal = portal_session(&state, &session).await?;

    portal.geolocator.report(report).map_err(|e| match e {
        LocationReportError::NoPendingRequest => AppError::Conflict(anyhow::Error::new(e)),
        LocationReportError::InvalidPosition(_) => AppError::BadRequest(anyhow::Error::new(e)),
    })?;

    Ok(Json(facilities_response(&state, &portal)))
}
