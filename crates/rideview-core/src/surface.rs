// The seam to the external rendering engine.
//
// The sync loop never talks to a concrete map library; it drives
// whatever implements `MapSurface`. The trait mirrors the handful of
// calls a MapLibre-style engine exposes for live data: source/layer
// installation and wholesale source replacement.

use geojson::FeatureCollection;
use rideview_api::Region;

/// Source id for the live vehicle GeoJSON source (and its layer).
pub const VEHICLES_SOURCE: &str = "buses";
/// Source id for the static transit background (stops/stations).
pub const TRANSIT_SOURCE: &str = "transit";

/// TileJSON URL for the transit stops/stations vector background.
pub const TRANSIT_TILEJSON_URL: &str = "https://ws-st.trimet.org/rtp/routers/default/vectorTiles/stops,stations,areaStops,rentalVehicles,rentalStations/tilejson.json";

/// How a circle layer colors its features.
#[derive(Debug, Clone, PartialEq)]
pub enum CircleColor {
    /// A single color for every feature.
    Fixed(String),
    /// Categorical mapping on the `routeNumber` property, with a
    /// fallback color for unmatched routes.
    ByRouteNumber {
        categories: Vec<(i64, String)>,
        fallback: String,
    },
}

/// A point-rendering layer over a source.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleLayer {
    pub id: String,
    pub source: String,
    /// For vector sources: the named layer inside the tileset.
    pub source_layer: Option<String>,
    pub radius: f64,
    pub color: CircleColor,
    pub opacity: f64,
}

impl CircleLayer {
    /// The live vehicle layer: colored by route, red fallback.
    pub fn vehicles(route_colors: Vec<(i64, String)>) -> Self {
        Self {
            id: VEHICLES_SOURCE.into(),
            source: VEHICLES_SOURCE.into(),
            source_layer: None,
            radius: 6.0,
            color: CircleColor::ByRouteNumber {
                categories: route_colors,
                fallback: "#FF0000".into(),
            },
            opacity: 0.8,
        }
    }

    /// Stop markers from the transit vector background.
    pub fn stops() -> Self {
        Self {
            id: "transit-stops".into(),
            source: TRANSIT_SOURCE.into(),
            source_layer: Some("stops".into()),
            radius: 4.0,
            color: CircleColor::Fixed("rgba(26,67,179,0.6)".into()),
            opacity: 1.0,
        }
    }

    /// Station markers from the transit vector background.
    pub fn stations() -> Self {
        Self {
            id: "transit-stations".into(),
            source: TRANSIT_SOURCE.into(),
            source_layer: Some("stations".into()),
            radius: 10.0,
            color: CircleColor::Fixed("rgba(255,21,0,0.57)".into()),
            opacity: 1.0,
        }
    }
}

/// Handle to a live map view.
///
/// Implementations are expected to be cheap handles with interior
/// mutability (a real engine binding, or the headless table renderer in
/// the CLI). The sync loop is the single writer of the vehicle source;
/// no other component may mutate it.
pub trait MapSurface: Send + Sync {
    /// Whether the map is initialized and able to accept sources/layers.
    fn is_ready(&self) -> bool;

    /// The currently visible extent, if the view has one yet.
    ///
    /// Two calls in quick succession during panning may legitimately
    /// return different regions.
    fn visible_bounds(&self) -> Option<Region>;

    /// Whether a source with this id is already installed.
    fn has_source(&self, id: &str) -> bool;

    /// Install a GeoJSON source with initial contents.
    fn add_geojson_source(&self, id: &str, initial: FeatureCollection);

    /// Install a remote vector-tile source from a TileJSON URL.
    fn add_vector_source(&self, id: &str, tilejson_url: &str);

    /// Install a circle layer over an existing source.
    fn add_circle_layer(&self, layer: CircleLayer);

    /// Replace the full contents of a GeoJSON source in one operation.
    fn set_geojson_data(&self, source: &str, data: FeatureCollection);
}
