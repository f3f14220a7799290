use std::collections::HashSet;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;

use super::endpoints;
use super::error::ApiError;
use super::SOURCE_NAME;
use crate::models::station::{StationRef, ThingRecord, ThingsPayload};

/// HTTP timeout for the per-cycle data fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
/// Shorter timeout for interactive setup lookups.
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = "floodwatch/0.1.0";

/// SensorThings API client. Issues single attempts and classifies outcomes
/// into the error taxonomy; retrying is the caller's job.
pub struct FloodClient {
    http: Client,
    base_url: String,
}

impl FloodClient {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: endpoints::STA_API.to_string(),
        })
    }

    /// One GET for the latest reading of every tracked station.
    pub async fn fetch_things(&self, tracked: &HashSet<i64>) -> Result<ThingsPayload, ApiError> {
        if tracked.is_empty() {
            return Err(ApiError::RequestFailed {
                name: SOURCE_NAME.to_string(),
                detail: "no tracked stations to query".to_string(),
            });
        }

        let url = format!(
            "{}{}?$filter=({})&$expand={}",
            self.base_url,
            endpoints::THINGS,
            thing_filter(tracked),
            endpoints::LATEST_OBSERVATION_EXPAND,
        );

        debug!("Station data request: {}", url);

        self.get_payload(&url, FETCH_TIMEOUT).await
    }

    /// Look up the API-assigned identifiers for a station code. Used when a
    /// station is first configured; `None` means the code matched nothing.
    pub async fn resolve_station(&self, station_code: &str) -> Result<Option<StationRef>, ApiError> {
        let url = format!(
            "{}{}?$filter=(properties/stationCode eq '{}')",
            self.base_url,
            endpoints::THINGS,
            station_code
        );

        debug!("Station lookup request: {}", url);

        let payload = self.get_payload(&url, LOOKUP_TIMEOUT).await?;
        if payload.count == 0 {
            return Ok(None);
        }

        let Some(raw) = payload.value.first() else {
            return Ok(None);
        };
        let record: ThingRecord =
            serde_json::from_value(raw.clone()).map_err(|e| ApiError::RequestFailed {
                name: SOURCE_NAME.to_string(),
                detail: e.to_string(),
            })?;
        let Some(thing_id) = record.id else {
            return Ok(None);
        };

        Ok(Some(StationRef {
            thing_id,
            station_id: record.properties.station_id,
        }))
    }

    async fn get_payload(&self, url: &str, timeout: Duration) -> Result<ThingsPayload, ApiError> {
        let response = match self
            .http
            .get(url)
            .header("Accept", "application/json")
            .timeout(timeout)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) if e.is_timeout() => {
                return Err(ApiError::RequestTimeout {
                    name: SOURCE_NAME.to_string(),
                    detail: e.to_string(),
                });
            }
            Err(e) => {
                return Err(ApiError::RequestFailed {
                    name: SOURCE_NAME.to_string(),
                    detail: e.to_string(),
                });
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::UnexpectedStatus {
                name: SOURCE_NAME.to_string(),
                code: status.as_u16(),
            });
        }

        response
            .json::<ThingsPayload>()
            .await
            .map_err(|e| ApiError::RequestFailed {
                name: SOURCE_NAME.to_string(),
                detail: e.to_string(),
            })
    }
}

/// Server-side `$filter` matching any tracked thing id.
fn thing_filter(tracked: &HashSet<i64>) -> String {
    let mut ids: Vec<i64> = tracked.iter().copied().collect();
    ids.sort_unstable();
    ids.iter()
        .map(|id| format!("@iot.id eq {}", id))
        .collect::<Vec<_>>()
        .join(" or ")
}
