//! Output formatting: table, JSON, plain.
//!
//! Renders a committed GeoJSON collection in the format selected by
//! `--output`. Table uses `tabled`, JSON serializes the collection
//! as-is, plain emits one vehicle id per line.

use geojson::FeatureCollection;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::OutputFormat;

#[derive(Tabled)]
struct VehicleRow {
    #[tabled(rename = "ROUTE")]
    route: String,
    #[tabled(rename = "VEHICLE")]
    vehicle: String,
    #[tabled(rename = "SIGN")]
    sign: String,
    #[tabled(rename = "POSITION")]
    position: String,
    #[tabled(rename = "BEARING")]
    bearing: String,
}

fn prop_string(feature: &geojson::Feature, key: &str) -> String {
    feature
        .properties
        .as_ref()
        .and_then(|props| props.get(key))
        .map_or_else(String::new, |value| match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        })
}

fn row(feature: &geojson::Feature) -> VehicleRow {
    let position = match &feature.geometry {
        Some(geojson::Geometry {
            value: geojson::Value::Point(coords),
            ..
        }) if coords.len() == 2 => format!("{:.5}, {:.5}", coords[1], coords[0]),
        _ => String::new(),
    };

    VehicleRow {
        route: prop_string(feature, "routeNumber"),
        vehicle: prop_string(feature, "vehicleID"),
        sign: prop_string(feature, "signMessage"),
        position,
        bearing: prop_string(feature, "bearing"),
    }
}

/// Render a committed collection in the chosen format.
pub fn render_collection(format: OutputFormat, collection: &FeatureCollection) -> String {
    match format {
        OutputFormat::Table => {
            let rows: Vec<VehicleRow> = collection.features.iter().map(row).collect();
            Table::new(rows).with(Style::rounded()).to_string()
        }
        OutputFormat::Json => {
            serde_json::to_string_pretty(collection).unwrap_or_else(|_| "{}".into())
        }
        OutputFormat::Plain => collection
            .features
            .iter()
            .map(|f| prop_string(f, "vehicleID"))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
