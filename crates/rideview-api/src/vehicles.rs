// Hand-crafted async HTTP client for the realtime vehicle query.
//
// Endpoint: GET /realtime-buses?bbox=minLon,minLat,maxLon,maxLat
// One request per poll cycle; cancellation is cooperative via a
// `CancellationToken` checked around each await point.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::region::Region;
use crate::transport::TransportConfig;

// ── Wire types ───────────────────────────────────────────────────────

/// One vehicle record as the backend sends it.
///
/// `latitude` and `longitude` are mandatory and must be numeric; the
/// display fields are tolerated as absent. Decoding policy: a body that
/// is not a JSON array fails the whole fetch as
/// [`Error::MalformedResponse`]; individual array elements that fail
/// this schema are dropped (and counted) rather than failing the fetch,
/// so one bad record never blanks the map.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVehicle {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub route_number: Option<i64>,
    #[serde(default)]
    pub sign_message: Option<String>,
    #[serde(rename = "vehicleID", default, deserialize_with = "de_vehicle_id")]
    pub vehicle_id: Option<String>,
    #[serde(default)]
    pub bearing: Option<f64>,
}

/// The backend sends vehicle IDs as either strings or bare numbers
/// depending on feed version; normalize both to a non-empty string.
fn de_vehicle_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// The raw result of one successful vehicle fetch.
#[derive(Debug, Clone)]
pub struct RawBatch {
    pub vehicles: Vec<RawVehicle>,
    /// Array elements discarded for failing schema validation.
    pub dropped: usize,
    pub fetched_at: DateTime<Utc>,
}

/// Outcome of a fetch attempt.
///
/// `Cancelled` is distinct from both success and failure so a caller
/// never commits data from a superseded fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    Fetched(RawBatch),
    Cancelled,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the realtime vehicle endpoint.
///
/// Does not retry internally; retry cadence belongs to the poll loop,
/// which keeps fetch semantics simple and cancellation composable.
#[derive(Debug, Clone)]
pub struct VehicleClient {
    http: reqwest::Client,
    base_url: Url,
}

impl VehicleClient {
    /// Build from a backend base URL and transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(
            http,
            crate::transport::normalize_base_url(base_url)?,
        ))
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    fn url(&self, path: &str) -> Url {
        self.base_url
            .join(path)
            .expect("path should be valid relative URL")
    }

    /// Fetch all vehicles currently inside `region`.
    ///
    /// Cancellation is checked before and across each await point; a
    /// cancelled call resolves to [`FetchOutcome::Cancelled`] with no
    /// partial state observable to the caller. Note cancellation here
    /// is best-effort; the poll loop's generation check at commit time
    /// is the correctness guard.
    pub async fn vehicles_in_region(
        &self,
        region: &Region,
        cancel: &CancellationToken,
    ) -> Result<FetchOutcome, Error> {
        if cancel.is_cancelled() {
            return Ok(FetchOutcome::Cancelled);
        }

        let url = self.url("realtime-buses");
        let bbox = region.bbox_param();
        debug!("GET {url} bbox={bbox}");

        let resp = tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(FetchOutcome::Cancelled),
            resp = self.http.get(url).query(&[("bbox", bbox)]).send() => resp?,
        };

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(FetchOutcome::Cancelled),
            body = resp.text() => body?,
        };

        let (vehicles, dropped) = decode_vehicles(&body)?;
        if dropped > 0 {
            debug!(dropped, "dropped vehicle records failing schema validation");
        }

        Ok(FetchOutcome::Fetched(RawBatch {
            vehicles,
            dropped,
            fetched_at: Utc::now(),
        }))
    }
}

/// Decode the response body into vehicle records.
///
/// The body must be a JSON array; elements failing the `RawVehicle`
/// schema are dropped individually and counted.
fn decode_vehicles(body: &str) -> Result<(Vec<RawVehicle>, usize), Error> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| Error::MalformedResponse {
            message: format!("response body is not valid JSON: {e}"),
            body: body.to_owned(),
        })?;

    let serde_json::Value::Array(elements) = value else {
        return Err(Error::MalformedResponse {
            message: "expected a JSON array of vehicle records".into(),
            body: body.to_owned(),
        });
    };

    let total = elements.len();
    let vehicles: Vec<RawVehicle> = elements
        .into_iter()
        .filter_map(|element| match serde_json::from_value(element) {
            Ok(vehicle) => Some(vehicle),
            Err(e) => {
                debug!(error = %e, "skipping malformed vehicle record");
                None
            }
        })
        .collect();
    let dropped = total - vehicles.len();

    Ok((vehicles, dropped))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn decode_accepts_numeric_vehicle_id() {
        let (vehicles, dropped) =
            decode_vehicles(r#"[{"latitude":45.5,"longitude":-122.6,"vehicleID":4012}]"#).unwrap();
        assert_eq!(dropped, 0);
        assert_eq!(vehicles[0].vehicle_id.as_deref(), Some("4012"));
    }

    #[test]
    fn decode_drops_record_missing_latitude() {
        let body = r#"[
            {"longitude":-122.6,"vehicleID":"1"},
            {"latitude":45.5,"longitude":-122.6,"vehicleID":"2"}
        ]"#;
        let (vehicles, dropped) = decode_vehicles(body).unwrap();
        assert_eq!(vehicles.len(), 1);
        assert_eq!(dropped, 1);
        assert_eq!(vehicles[0].vehicle_id.as_deref(), Some("2"));
    }

    #[test]
    fn decode_drops_record_with_non_numeric_longitude() {
        let body = r#"[{"latitude":45.5,"longitude":"west","vehicleID":"1"}]"#;
        let (vehicles, dropped) = decode_vehicles(body).unwrap();
        assert!(vehicles.is_empty());
        assert_eq!(dropped, 1);
    }

    #[test]
    fn decode_rejects_non_array_body() {
        let result = decode_vehicles(r#"{"resultSet":{}}"#);
        assert!(matches!(result, Err(Error::MalformedResponse { .. })));
    }

    #[test]
    fn decode_rejects_invalid_json() {
        let result = decode_vehicles("<html>503</html>");
        assert!(matches!(result, Err(Error::MalformedResponse { .. })));
    }

    #[test]
    fn decode_tolerates_missing_display_fields() {
        let (vehicles, dropped) =
            decode_vehicles(r#"[{"latitude":45.5,"longitude":-122.6}]"#).unwrap();
        assert_eq!(dropped, 0);
        assert!(vehicles[0].route_number.is_none());
        assert!(vehicles[0].sign_message.is_none());
        assert!(vehicles[0].bearing.is_none());
    }
}
