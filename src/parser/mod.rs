use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Local};
use tracing::warn;

use crate::api::error::ApiError;
use crate::api::SOURCE_NAME;
use crate::models::station::{StationReading, StationSnapshot, ThingRecord, ThingsPayload};

/// Geographic operating region of the service. Raw coordinate pairs arrive
/// with no declared axis order and are validated against these bounds.
const LAT_RANGE: (f64, f64) = (10.36, 26.40);
const LON_RANGE: (f64, f64) = (114.35, 122.11);

/// Extract one reading per tracked station from a raw payload.
///
/// Pure function of its inputs. Records for untracked stations are dropped.
/// A record that fails to decode is logged and skipped without aborting the
/// batch; `DataNotFound` is returned only when the whole payload is empty or
/// nothing tracked survived.
pub fn parse(payload: &ThingsPayload, tracked: &HashSet<i64>) -> Result<StationSnapshot, ApiError> {
    if payload.count == 0 || payload.value.is_empty() {
        return Err(ApiError::DataNotFound {
            name: SOURCE_NAME.to_string(),
        });
    }

    let mut snapshot = HashMap::new();

    for raw in &payload.value {
        let record: ThingRecord = match serde_json::from_value(raw.clone()) {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping station record that failed to decode: {}", e);
                continue;
            }
        };

        let thing_id = match record.id {
            Some(id) if tracked.contains(&id) => id,
            _ => continue,
        };

        let Some(code) = record.properties.station_code.clone() else {
            warn!("Station record {} has no station code. Skipping...", thing_id);
            continue;
        };

        let mut reading = StationReading {
            thing_id: Some(thing_id),
            station_id: record.properties.station_id.clone(),
            station_code: code.clone(),
            station_name: record.properties.station_name.clone(),
            authority_type: record.properties.authority_type.clone(),
            latitude: None,
            longitude: None,
            water_level: None,
            update_time: "unknown".to_string(),
        };

        let stream = record.datastreams.first();

        if let Some(area) = stream.and_then(|d| d.observed_area.as_ref()) {
            if let Some((lat, lon)) = resolve_coordinates(&area.coordinates) {
                reading.latitude = Some(lat);
                reading.longitude = Some(lon);
            }
        }

        match stream.and_then(|d| d.observations.first()) {
            Some(obs) => {
                reading.water_level = obs.result;
                reading.update_time = localize_timestamp(obs.phenomenon_time.as_deref());
            }
            None => {
                warn!("No observations found for station {}. Reporting no reading", code);
            }
        }

        snapshot.insert(code, reading);
    }

    if snapshot.is_empty() {
        return Err(ApiError::DataNotFound {
            name: SOURCE_NAME.to_string(),
        });
    }

    Ok(snapshot)
}

/// Decide which of the two raw numbers is latitude and which is longitude.
///
/// Exactly one assignment must land inside the service region; when neither
/// (or, were the ranges ever to overlap, both) validate, the position is
/// unknown.
pub fn resolve_coordinates(coords: &[f64]) -> Option<(f64, f64)> {
    let (a, b) = match coords {
        [a, b, ..] => (*a, *b),
        _ => return None,
    };

    let as_given = in_range(LAT_RANGE, a) && in_range(LON_RANGE, b);
    let swapped = in_range(LAT_RANGE, b) && in_range(LON_RANGE, a);

    match (as_given, swapped) {
        (true, false) => Some((a, b)),
        (false, true) => Some((b, a)),
        _ => None,
    }
}

fn in_range((lo, hi): (f64, f64), v: f64) -> bool {
    lo <= v && v <= hi
}

/// Normalize a UTC phenomenon time to a local display string. Anything that
/// is missing or fails to parse becomes `"unknown"`, never an error.
pub fn localize_timestamp(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return "unknown".to_string();
    };

    match DateTime::parse_from_rfc3339(raw) {
        Ok(utc) => utc
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        Err(e) => {
            warn!("Could not parse observation time '{}': {}", raw, e);
            "unknown".to_string()
        }
    }
}
