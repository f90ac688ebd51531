//! Live-layer synchronization between the rideview backend and a map surface.
//!
//! This crate owns the control loop that keeps a map's live vehicle layer in
//! sync with whatever region the user is currently viewing:
//!
//! - **[`LiveLayerSync`]**: the core state machine. Installs the live data
//!   source and its layers idempotently once the surface is ready, then
//!   drives a generation-numbered poll cycle: derive a query region from the
//!   viewport, fetch vehicles inside it, transform them into a GeoJSON
//!   `FeatureCollection`, and commit the collection wholesale, discarding
//!   any fetch whose generation has been superseded so the map never
//!   flickers back to older data.
//!
//! - **[`MapSurface`]**: the seam to the external rendering engine. The
//!   sync loop only ever talks to the map through this trait, so tests (and
//!   the headless CLI) swap in their own surfaces.
//!
//! - **[`VehicleSource`]**: the seam to the network. The production
//!   implementation ([`BackendVehicleSource`]) wraps
//!   [`rideview_api::VehicleClient`] and converts wire records into the
//!   domain [`Vehicle`] type.
//!
//! - **[`viewport::current_region`]**: viewport to query region, returning
//!   `None` while the map has no defined extent (a legitimate "not yet
//!   ready" state, not an error).

pub mod convert;
pub mod model;
pub mod source;
pub mod surface;
pub mod sync;
pub mod viewport;

// ── Primary re-exports ──────────────────────────────────────────────
pub use model::{Vehicle, VehicleSnapshot};
pub use source::{BackendVehicleSource, SourceFetch, VehicleSource};
pub use surface::{CircleColor, CircleLayer, MapSurface};
pub use sync::{LiveLayerSync, SyncOptions, TickOutcome};

pub use rideview_api::Region;
