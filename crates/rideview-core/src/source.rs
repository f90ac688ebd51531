// The seam to the network: where the sync loop gets vehicle snapshots.

use std::future::Future;

use rideview_api::{FetchOutcome, Region, VehicleClient};
use tokio_util::sync::CancellationToken;

use crate::convert;
use crate::model::VehicleSnapshot;

/// Result of one source fetch.
///
/// `Cancelled` is distinct from success and failure: a cancelled fetch
/// produced no observable state and must never be committed.
#[derive(Debug)]
pub enum SourceFetch {
    Snapshot(VehicleSnapshot),
    Cancelled,
}

/// Supplier of vehicle snapshots for a region.
///
/// Implementations must not retry internally (the poll cadence is the
/// retry policy) and should honor `cancel` cooperatively where their
/// transport supports it. The generation check at commit time remains
/// the correctness guard either way.
pub trait VehicleSource: Send + Sync {
    fn fetch(
        &self,
        region: &Region,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<SourceFetch, rideview_api::Error>> + Send;
}

/// Production source: the backend's realtime vehicle endpoint.
#[derive(Debug, Clone)]
pub struct BackendVehicleSource {
    client: VehicleClient,
}

impl BackendVehicleSource {
    pub fn new(client: VehicleClient) -> Self {
        Self { client }
    }
}

impl VehicleSource for BackendVehicleSource {
    async fn fetch(
        &self,
        region: &Region,
        cancel: &CancellationToken,
    ) -> Result<SourceFetch, rideview_api::Error> {
        match self.client.vehicles_in_region(region, cancel).await? {
            FetchOutcome::Fetched(batch) => {
                Ok(SourceFetch::Snapshot(convert::snapshot_from_batch(batch)))
            }
            FetchOutcome::Cancelled => Ok(SourceFetch::Cancelled),
        }
    }
}
