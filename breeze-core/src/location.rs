//! The currently selected location, published through a watch channel like
//! the dashboard state. Selection never triggers a data fetch by itself;
//! composing with the aggregation service is the caller's move.

use tokio::sync::watch;
use tracing::warn;

use crate::geolocate::Geolocator;
use crate::model::{GeocodeCandidate, GeolocationError, Location};

/// Label used for a device-resolved location.
pub const CURRENT_LOCATION_LABEL: &str = "Current Location";

#[derive(Debug, Clone, Default)]
pub struct LocationSnapshot {
    pub location: Option<Location>,
    pub is_locating: bool,
}

#[derive(Debug)]
pub struct LocationState {
    tx: watch::Sender<LocationSnapshot>,
}

impl Default for LocationState {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationState {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(LocationSnapshot::default());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<LocationSnapshot> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Option<Location> {
        self.tx.borrow().location.clone()
    }

    pub fn is_locating(&self) -> bool {
        self.tx.borrow().is_locating
    }

    /// Replace the current location with a search selection.
    pub fn select(&self, candidate: &GeocodeCandidate) -> Location {
        let location = Location {
            label: candidate.label.clone(),
            lat: candidate.lat.clone(),
            lon: candidate.lon.clone(),
        };

        self.tx.send_modify(|snapshot| snapshot.location = Some(location.clone()));
        location
    }

    /// Resolve the machine's own position and select it.
    ///
    /// On failure the loading flag is cleared and the error returned, so
    /// the caller can decide not to proceed to a data fetch.
    pub async fn locate(
        &self,
        locator: &dyn Geolocator,
    ) -> Result<Location, GeolocationError> {
        self.tx.send_modify(|snapshot| snapshot.is_locating = true);

        let result = locator.current_position().await;

        match result {
            Ok(coords) => {
                let location = Location {
                    label: CURRENT_LOCATION_LABEL.to_string(),
                    lat: coords.lat.to_string(),
                    lon: coords.lon.to_string(),
                };

                self.tx.send_modify(|snapshot| {
                    snapshot.location = Some(location.clone());
                    snapshot.is_locating = false;
                });
                Ok(location)
            }
            Err(err) => {
                warn!(%err, "unable to resolve the current location");
                self.tx.send_modify(|snapshot| snapshot.is_locating = false);
                Err(err)
            }
        }
    }

    pub fn clear(&self) {
        self.tx.send_modify(|snapshot| snapshot.location = None);
    }
}
