use std::collections::HashSet;

use async_trait::async_trait;

use crate::api::client::FloodClient;
use crate::api::error::ApiError;
use crate::api::SOURCE_NAME;
use crate::models::station::{StationSnapshot, TrackedStation};
use crate::parser;

/// A pollable provider of station readings.
///
/// One concrete implementation today; any further station-data source
/// implements the same interface and plugs into the same poll loop.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Source tag used in logs and notifications.
    fn name(&self) -> &str;

    /// One fetch-and-parse attempt. No internal retries — the retry policy
    /// is the caller's job.
    async fn fetch(&self) -> Result<StationSnapshot, ApiError>;
}

/// Flood-depth readings from the Civil IoT SensorThings API.
pub struct FloodSource {
    client: FloodClient,
    tracked: HashSet<i64>,
}

impl FloodSource {
    pub fn new(client: FloodClient, stations: &[TrackedStation]) -> Self {
        let tracked = stations.iter().map(|s| s.thing_id).collect();
        Self { client, tracked }
    }
}

#[async_trait]
impl DataSource for FloodSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch(&self) -> Result<StationSnapshot, ApiError> {
        let payload = self.client.fetch_things(&self.tracked).await?;
        parser::parse(&payload, &self.tracked)
    }
}
