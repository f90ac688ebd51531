// Canonical domain types.
//
// Wire types live in `rideview-api`; these are what the sync loop and
// UI consumers work with. A snapshot is immutable once captured and is
// superseded wholesale by the next fetch; there is no field-level merge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One live vehicle at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Stable identity, non-empty (the backend's `vehicleID`).
    pub id: String,
    pub longitude: f64,
    pub latitude: f64,
    /// Heading in degrees, 0–360, where the feed supplies one.
    pub bearing: Option<f64>,
    /// Route the vehicle is serving (the backend's `routeNumber`).
    pub route_number: Option<i64>,
    /// Destination sign text (the backend's `signMessage`).
    pub sign_message: String,
}

/// An ordered set of vehicles captured by one fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    pub vehicles: Vec<Vehicle>,
    /// Wire records discarded during decode or conversion.
    pub dropped: usize,
    /// Capture time, used only for staleness inspection.
    pub captured_at: DateTime<Utc>,
}

impl VehicleSnapshot {
    /// An empty snapshot captured now.
    pub fn empty() -> Self {
        Self {
            vehicles: Vec::new(),
            dropped: 0,
            captured_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}
