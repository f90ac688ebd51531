//! A `MapSurface` without a map.
//!
//! The CLI has no rendering engine; this surface stands in for one with
//! a fixed viewport, so the same sync loop that would feed a MapLibre
//! binding instead prints each committed snapshot to stdout. Source and
//! layer installation is recorded (and logged) rather than drawn.

use std::io::{self, Write};
use std::sync::Mutex;

use chrono::Local;
use geojson::FeatureCollection;
use owo_colors::OwoColorize;
use tracing::info;

use rideview_api::Region;
use rideview_core::{CircleLayer, MapSurface};

use crate::cli::OutputFormat;
use crate::output;

pub struct HeadlessSurface {
    region: Region,
    format: OutputFormat,
    sources: Mutex<Vec<String>>,
}

impl HeadlessSurface {
    pub fn new(region: Region, format: OutputFormat) -> Self {
        Self {
            region,
            format,
            sources: Mutex::new(Vec::new()),
        }
    }
}

impl MapSurface for HeadlessSurface {
    fn is_ready(&self) -> bool {
        true
    }

    fn visible_bounds(&self) -> Option<Region> {
        Some(self.region)
    }

    fn has_source(&self, id: &str) -> bool {
        self.sources
            .lock()
            .is_ok_and(|sources| sources.iter().any(|s| s == id))
    }

    fn add_geojson_source(&self, id: &str, _initial: FeatureCollection) {
        info!(source = id, "installed live data source");
        if let Ok(mut sources) = self.sources.lock() {
            sources.push(id.to_owned());
        }
    }

    fn add_vector_source(&self, id: &str, tilejson_url: &str) {
        info!(source = id, url = tilejson_url, "installed vector source");
        if let Ok(mut sources) = self.sources.lock() {
            sources.push(id.to_owned());
        }
    }

    fn add_circle_layer(&self, layer: CircleLayer) {
        info!(layer = %layer.id, source = %layer.source, "installed layer");
    }

    fn set_geojson_data(&self, _source: &str, data: FeatureCollection) {
        let header = format!(
            "{} vehicle(s) in view at {}",
            data.features.len(),
            Local::now().format("%H:%M:%S")
        );

        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", header.bold());
        let _ = writeln!(stdout, "{}", output::render_collection(self.format, &data));
    }
}
