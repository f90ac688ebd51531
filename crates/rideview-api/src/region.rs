// Geographic bounding box used to scope a vehicle query.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// An axis-aligned bounding box in WGS84 degrees.
///
/// Invariant: `min_lon < max_lon` and `min_lat < max_lat`, all finite.
/// Derived fresh from the viewport on every poll cycle; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Region {
    /// Construct a region, validating the bounding-box invariant.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self, Error> {
        let finite =
            min_lon.is_finite() && min_lat.is_finite() && max_lon.is_finite() && max_lat.is_finite();
        if !finite {
            return Err(Error::InvalidRegion {
                reason: "coordinates must be finite",
            });
        }
        if min_lon >= max_lon {
            return Err(Error::InvalidRegion {
                reason: "min_lon must be less than max_lon",
            });
        }
        if min_lat >= max_lat {
            return Err(Error::InvalidRegion {
                reason: "min_lat must be less than max_lat",
            });
        }
        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    /// Serialize as the backend's `bbox` query value:
    /// `minLon,minLat,maxLon,maxLat` at full floating precision.
    pub fn bbox_param(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bbox_param_preserves_full_precision() {
        let region = Region::new(-122.719_902_630_865_56, 45.512_031, -122.664_971, 45.527_968)
            .unwrap();
        assert_eq!(
            region.bbox_param(),
            "-122.71990263086556,45.512031,-122.664971,45.527968"
        );
    }

    #[test]
    fn rejects_inverted_longitude() {
        let result = Region::new(-122.0, 45.0, -123.0, 46.0);
        assert!(matches!(result, Err(Error::InvalidRegion { .. })));
    }

    #[test]
    fn rejects_degenerate_latitude() {
        let result = Region::new(-122.0, 45.0, -121.0, 45.0);
        assert!(matches!(result, Err(Error::InvalidRegion { .. })));
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let result = Region::new(f64::NAN, 45.0, -121.0, 46.0);
        assert!(matches!(result, Err(Error::InvalidRegion { .. })));
    }
}
