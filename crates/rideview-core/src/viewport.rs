// Viewport → query region.

use rideview_api::Region;

use crate::surface::MapSurface;

/// Derive the query region from the surface's current visible extent.
///
/// Returns `None` while the map is not initialized or has no defined
/// extent, a legitimate "not yet ready" state the poll cycle skips
/// without error. No rounding is applied: over-fetching slivers is
/// acceptable, under-fetching is not.
pub fn current_region<S: MapSurface + ?Sized>(surface: &S) -> Option<Region> {
    if !surface.is_ready() {
        return None;
    }
    surface.visible_bounds()
}
