//! Geolocation acquisition.
//!
//! Position fixes come from the visitor's browser: the page calls
//! `navigator.geolocation.getCurrentPosition` and posts the outcome back.
//! [`BrowserGeolocator`] turns that round trip into a single awaitable
//! [`Geolocator::acquire`] call.

use crate::models::geo::{Coordinate, InvalidCoordinate};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Geolocation is not supported by this browser.")]
    Unsupported,

    #[error("Location permission denied. Please enable it in your browser.")]
    PermissionDenied,

    #[error("Unable to determine your location. Please try again.")]
    Unavailable,
}

/// Single-shot position lookup.
#[async_trait]
pub trait Geolocator: Send + Sync {
    /// Ask the host for the current position exactly once. No retries.
    async fn acquire(&self) -> Result<Coordinate, GeolocationError>;
}

/// Outcome of `getCurrentPosition` as posted by the browser.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LocationReport {
    Position { latitude: f64, longitude: f64 },
    /// `GeolocationPositionError.code`: 1 permission denied,
    /// 2 position unavailable, 3 timeout.
    Error { code: u16 },
    /// `navigator.geolocation` is missing.
    Unsupported,
}

impl LocationReport {
    pub fn into_result(self) -> Result<Result<Coordinate, GeolocationError>, InvalidCoordinate> {
        match self {
            LocationReport::Position {
                latitude,
                longitude,
            } => Coordinate::try_new(latitude, longitude).map(Ok),
            LocationReport::Error { code: 1 } => Ok(Err(GeolocationError::PermissionDenied)),
            LocationReport::Error { .. } => Ok(Err(GeolocationError::Unavailable)),
            LocationReport::Unsupported => Ok(Err(GeolocationError::Unsupported)),
        }
    }
}

#[derive(Debug, Error)]
pub enum LocationReportError {
    #[error("no location request is pending")]
    NoPendingRequest,

    #[error("invalid position: {0}")]
    InvalidPosition(#[from] InvalidCoordinate),
}

type Fix = Result<Coordinate, GeolocationError>;

/// Rendezvous between a search waiting for a fix and the browser reporting one.
#[derive(Debug, Default)]
enum Slot {
    #[default]
    Idle,
    /// A search has been started; the report may land before `acquire` runs.
    Armed,
    Waiting(oneshot::Sender<Fix>),
    Reported(Fix),
}

/// [`Geolocator`] fed by position reports posted from the browser.
#[derive(Debug)]
pub struct BrowserGeolocator {
    slot: Mutex<Slot>,
    timeout: Duration,
}

impl BrowserGeolocator {
    /// `timeout` bounds how long `acquire` waits for the browser before
    /// giving up with [`GeolocationError::Unavailable`].
    pub fn new(timeout: Duration) -> Self {
        Self {
            slot: Mutex::new(Slot::Idle),
            timeout,
        }
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Open the slot for one report ahead of `acquire`.
    ///
    /// Called when a search is accepted so a fast browser reply cannot race
    /// the task that will await it. Discards any unconsumed report.
    pub fn arm(&self) {
        let mut slot = self.slot();
        if !matches!(*slot, Slot::Waiting(_)) {
            *slot = Slot::Armed;
        }
    }

    /// Whether a report would currently be accepted.
    pub fn is_expecting_report(&self) -> bool {
        matches!(*self.slot(), Slot::Armed | Slot::Waiting(_))
    }

    /// Whether an `acquire` call is parked waiting for the browser.
    pub fn is_waiting(&self) -> bool {
        matches!(*self.slot(), Slot::Waiting(_))
    }

    /// Deliver the browser's answer to the pending request.
    pub fn report(&self, report: LocationReport) -> Result<(), LocationReportError> {
        let fix = report.into_result()?;
        let mut slot = self.slot();

        match std::mem::take(&mut *slot) {
            Slot::Armed => {
                *slot = Slot::Reported(fix);
                Ok(())
            }
            Slot::Waiting(tx) => tx
                .send(fix)
                .map_err(|_| LocationReportError::NoPendingRequest),
            previous @ (Slot::Idle | Slot::Reported(_)) => {
                *slot = previous;
                Err(LocationReportError::NoPendingRequest)
            }
        }
    }
}

#[async_trait]
impl Geolocator for BrowserGeolocator {
    async fn acquire(&self) -> Result<Coordinate, GeolocationError> {
        let rx = {
            let mut slot = self.slot();
            if let Slot::Reported(fix) = std::mem::take(&mut *slot) {
                return fix;
            }
            let (tx, rx) = oneshot::channel();
            *slot = Slot::Waiting(tx);
            rx
        };

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(fix)) => fix,
            Ok(Err(_)) => Err(GeolocationError::Unavailable),
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.timeout.as_secs(),
                    "Browser did not report a position in time"
                );
                let mut slot = self.slot();
                if matches!(*slot, Slot::Waiting(_)) {
                    *slot = Slot::Idle;
                }
                Err(GeolocationError::Unavailable)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn position(latitude: f64, longitude: f64) -> LocationReport {
        LocationReport::Position {
            latitude,
            longitude,
        }
    }

    #[test]
    fn error_codes_map_to_geolocation_errors() {
        assert_eq!(
            LocationReport::Error { code: 1 }.into_result().unwrap(),
            Err(GeolocationError::PermissionDenied)
        );
        assert_eq!(
            LocationReport::Error { code: 2 }.into_result().unwrap(),
            Err(GeolocationError::Unavailable)
        );
        assert_eq!(
            LocationReport::Error { code: 3 }.into_result().unwrap(),
            Err(GeolocationError::Unavailable)
        );
        assert_eq!(
            LocationReport::Unsupported.into_result().unwrap(),
            Err(GeolocationError::Unsupported)
        );
    }

    #[test]
    fn report_json_uses_status_tag() {
        let report: LocationReport =
            serde_json::from_str(r#"{"status":"position","latitude":22.0,"longitude":88.0}"#)
                .unwrap();
        assert_eq!(report, position(22.0, 88.0));

        let report: LocationReport =
            serde_json::from_str(r#"{"status":"error","code":1}"#).unwrap();
        assert_eq!(report, LocationReport::Error { code: 1 });
    }

    #[test]
    fn report_without_pending_request_is_rejected() {
        let geolocator = BrowserGeolocator::new(Duration::from_secs(1));
        let err = geolocator.report(position(22.0, 88.0)).unwrap_err();
        assert!(matches!(err, LocationReportError::NoPendingRequest));
    }

    #[test]
    fn invalid_position_is_rejected() {
        let geolocator = BrowserGeolocator::new(Duration::from_secs(1));
        geolocator.arm();
        let err = geolocator.report(position(123.0, 88.0)).unwrap_err();
        assert!(matches!(err, LocationReportError::InvalidPosition(_)));
        assert!(geolocator.is_expecting_report());
    }

    #[tokio::test]
    async fn armed_report_is_consumed_by_next_acquire() {
        let geolocator = BrowserGeolocator::new(Duration::from_secs(1));
        geolocator.arm();
        geolocator.report(position(22.0, 88.0)).unwrap();

        assert_eq!(geolocator.acquire().await, Ok(Coordinate::new(22.0, 88.0)));
        assert!(!geolocator.is_expecting_report());
    }

    #[tokio::test]
    async fn waiting_acquire_is_resolved_by_report() {
        let geolocator = Arc::new(BrowserGeolocator::new(Duration::from_secs(5)));
        let task = {
            let geolocator = geolocator.clone();
            tokio::spawn(async move { geolocator.acquire().await })
        };

        while !geolocator.is_waiting() {
            tokio::task::yield_now().await;
        }
        geolocator.report(LocationReport::Error { code: 1 }).unwrap();

        assert_eq!(task.await.unwrap(), Err(GeolocationError::PermissionDenied));
    }

    #[tokio::test]
    async fn silent_browser_times_out_as_unavailable() {
        let geolocator = BrowserGeolocator::new(Duration::from_millis(20));

        assert_eq!(
            geolocator.acquire().await,
            Err(GeolocationError::Unavailable)
        );
        assert!(!geolocator.is_expecting_report());
    }
}
