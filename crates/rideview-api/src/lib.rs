// rideview-api: Async Rust clients for the rideview transit backend.
//
// Two small HTTP surfaces: the per-poll vehicle query (`VehicleClient`)
// and the one-shot style/config retrieval (`StyleClient`).

pub mod error;
pub mod region;
pub mod style;
pub mod transport;
pub mod vehicles;

pub use error::Error;
pub use region::Region;
pub use style::StyleClient;
pub use transport::TransportConfig;
pub use vehicles::{FetchOutcome, RawBatch, RawVehicle, VehicleClient};
