// Wire → domain conversion and the GeoJSON transform.
//
// `RawVehicle` records come from `rideview-api` with position already
// validated; here we additionally require a usable identity. Records
// without one are dropped and counted on the snapshot, mirroring the
// per-element decode policy at the wire boundary.

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, Value};
use rideview_api::{RawBatch, RawVehicle};
use tracing::debug;

use crate::model::{Vehicle, VehicleSnapshot};

/// Convert one wire record, or `None` if it has no usable identity.
fn vehicle_from_raw(raw: RawVehicle) -> Option<Vehicle> {
    let id = raw.vehicle_id?;
    Some(Vehicle {
        id,
        longitude: raw.longitude,
        latitude: raw.latitude,
        bearing: raw.bearing,
        route_number: raw.route_number,
        sign_message: raw.sign_message.unwrap_or_default(),
    })
}

/// Convert a raw fetch batch into a domain snapshot.
pub fn snapshot_from_batch(batch: RawBatch) -> VehicleSnapshot {
    let total = batch.vehicles.len();
    let vehicles: Vec<Vehicle> = batch
        .vehicles
        .into_iter()
        .filter_map(vehicle_from_raw)
        .collect();

    let dropped_here = total - vehicles.len();
    if dropped_here > 0 {
        debug!(dropped = dropped_here, "dropped vehicle records without an id");
    }

    VehicleSnapshot {
        vehicles,
        dropped: batch.dropped + dropped_here,
        captured_at: batch.fetched_at,
    }
}

/// Transform a snapshot into the GeoJSON collection committed to the
/// live data source: one `Point` feature per vehicle at
/// `[longitude, latitude]`, carrying `routeNumber` / `signMessage` /
/// `vehicleID` / `bearing` through unchanged.
pub fn feature_collection(snapshot: &VehicleSnapshot) -> FeatureCollection {
    let features = snapshot
        .vehicles
        .iter()
        .map(|vehicle| {
            let mut properties = serde_json::Map::new();
            properties.insert(
                "routeNumber".into(),
                vehicle
                    .route_number
                    .map_or(serde_json::Value::Null, Into::into),
            );
            properties.insert("signMessage".into(), vehicle.sign_message.clone().into());
            properties.insert("vehicleID".into(), vehicle.id.clone().into());
            properties.insert(
                "bearing".into(),
                vehicle.bearing.map_or(serde_json::Value::Null, Into::into),
            );

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![
                    vehicle.longitude,
                    vehicle.latitude,
                ]))),
                id: Some(Id::String(vehicle.id.clone())),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample_vehicle() -> Vehicle {
        Vehicle {
            id: "1234".into(),
            longitude: -122.68,
            latitude: 45.52,
            bearing: Some(90.0),
            route_number: Some(9),
            sign_message: "To Downtown".into(),
        }
    }

    fn snapshot(vehicles: Vec<Vehicle>) -> VehicleSnapshot {
        VehicleSnapshot {
            vehicles,
            dropped: 0,
            captured_at: Utc::now(),
        }
    }

    #[test]
    fn one_point_feature_per_vehicle() {
        let snap = snapshot(vec![
            sample_vehicle(),
            Vehicle {
                id: "5678".into(),
                ..sample_vehicle()
            },
        ]);
        let collection = feature_collection(&snap);
        assert_eq!(collection.features.len(), 2);
    }

    #[test]
    fn feature_carries_coordinates_and_properties_through() {
        let snap = snapshot(vec![sample_vehicle()]);
        let collection = feature_collection(&snap);

        let feature = &collection.features[0];
        let Some(Geometry {
            value: Value::Point(coords),
            ..
        }) = &feature.geometry
        else {
            panic!("expected a Point geometry");
        };
        assert_eq!(coords.as_slice(), &[-122.68, 45.52]);

        let props = feature.properties.as_ref().unwrap();
        assert_eq!(props["routeNumber"], serde_json::json!(9));
        assert_eq!(props["signMessage"], serde_json::json!("To Downtown"));
        assert_eq!(props["vehicleID"], serde_json::json!("1234"));
        assert_eq!(props["bearing"], serde_json::json!(90.0));
    }

    #[test]
    fn missing_optional_fields_become_null_properties() {
        let snap = snapshot(vec![Vehicle {
            bearing: None,
            route_number: None,
            ..sample_vehicle()
        }]);
        let collection = feature_collection(&snap);
        let props = collection.features[0].properties.as_ref().unwrap();
        assert_eq!(props["routeNumber"], serde_json::Value::Null);
        assert_eq!(props["bearing"], serde_json::Value::Null);
    }

    #[test]
    fn empty_snapshot_is_an_empty_collection() {
        let collection = feature_collection(&VehicleSnapshot::empty());
        assert!(collection.features.is_empty());
    }

    #[test]
    fn records_without_id_are_dropped_and_counted() {
        let batch = RawBatch {
            vehicles: vec![
                RawVehicle {
                    latitude: 45.52,
                    longitude: -122.68,
                    route_number: Some(9),
                    sign_message: None,
                    vehicle_id: None,
                    bearing: None,
                },
                RawVehicle {
                    latitude: 45.53,
                    longitude: -122.69,
                    route_number: Some(14),
                    sign_message: Some("To Hawthorne".into()),
                    vehicle_id: Some("77".into()),
                    bearing: Some(180.0),
                },
            ],
            dropped: 1,
            fetched_at: Utc::now(),
        };

        let snap = snapshot_from_batch(batch);
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.dropped, 2);
        assert_eq!(snap.vehicles[0].id, "77");
        assert_eq!(snap.vehicles[0].sign_message, "To Hawthorne");
    }
}
