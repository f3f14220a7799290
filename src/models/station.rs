use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Raw SensorThings `Things` collection response.
///
/// Records are kept as raw JSON so one malformed entry cannot sink the whole
/// batch — the parser decodes them one at a time and drops the bad ones.
#[derive(Debug, Deserialize)]
pub struct ThingsPayload {
    #[serde(rename = "@iot.count", default)]
    pub count: u64,
    #[serde(default)]
    pub value: Vec<serde_json::Value>,
}

/// One `Thing` (a monitored station) with its expanded datastreams.
#[derive(Debug, Deserialize)]
pub struct ThingRecord {
    #[serde(rename = "@iot.id")]
    pub id: Option<i64>,
    #[serde(default)]
    pub properties: ThingProperties,
    #[serde(rename = "Datastreams", default)]
    pub datastreams: Vec<DatastreamRecord>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ThingProperties {
    #[serde(rename = "stationCode")]
    pub station_code: Option<String>,
    #[serde(rename = "stationID")]
    pub station_id: Option<String>,
    #[serde(rename = "stationName")]
    pub station_name: Option<String>,
    pub authority_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DatastreamRecord {
    #[serde(rename = "observedArea")]
    pub observed_area: Option<ObservedArea>,
    #[serde(rename = "Observations", default)]
    pub observations: Vec<ObservationRecord>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ObservedArea {
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ObservationRecord {
    pub result: Option<f64>,
    #[serde(rename = "phenomenonTime")]
    pub phenomenon_time: Option<String>,
}

/// Cleaned per-station reading.
///
/// `water_level: None` means the station reported no observation this cycle.
/// That is distinct from a reading of zero and must stay distinct downstream:
/// consumers render "no reading", never 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationReading {
    pub thing_id: Option<i64>,
    pub station_id: Option<String>,
    pub station_code: String,
    pub station_name: Option<String>,
    pub authority_type: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub water_level: Option<f64>,
    /// Local time formatted `%Y-%m-%d %H:%M:%S`, or `"unknown"`.
    pub update_time: String,
}

/// Latest readings keyed by station code. Replaced wholesale each successful
/// poll cycle — readers always see a complete snapshot, never a partial one.
pub type StationSnapshot = HashMap<String, StationReading>;

/// A station the host asked us to track. Fixed at configuration time.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackedStation {
    pub code: String,
    pub name: String,
    pub thing_id: i64,
    #[serde(default)]
    pub station_id: Option<String>,
}

/// Setup-time lookup result for a station code.
#[derive(Debug, Clone)]
pub struct StationRef {
    pub thing_id: i64,
    pub station_id: Option<String>,
}
