use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::models::station::TrackedStation;

pub const CONFIG_FILE: &str = "floodwatch.toml";

/// Application configuration: the tracked station set and the poll cadence.
/// The station list is fixed for the lifetime of a coordinator — changing it
/// means restarting with a new config.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default)]
    pub stations: Vec<TrackedStation>,
}

fn default_poll_interval() -> u64 {
    300
}
fn default_max_attempts() -> u32 {
    5
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&data).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml(data: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(data).context("Failed to parse config")?;
        if config.stations.is_empty() {
            bail!("No stations configured — add at least one [[stations]] entry");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stations_and_applies_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [[stations]]
            code = "A1"
            name = "Riverside Rd."
            thing_id = 7
            station_id = "S1"

            [[stations]]
            code = "B2"
            name = "Harbor St."
            thing_id = 12
            "#,
        )
        .unwrap();

        assert_eq!(config.poll_interval_secs, 300);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.stations.len(), 2);
        assert_eq!(config.stations[0].code, "A1");
        assert_eq!(config.stations[0].station_id.as_deref(), Some("S1"));
        assert_eq!(config.stations[1].thing_id, 12);
        assert!(config.stations[1].station_id.is_none());
    }

    #[test]
    fn overrides_cadence() {
        let config = AppConfig::from_toml(
            r#"
            poll_interval_secs = 600
            max_attempts = 3

            [[stations]]
            code = "A1"
            name = "Riverside Rd."
            thing_id = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.poll_interval_secs, 600);
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn rejects_an_empty_station_list() {
        assert!(AppConfig::from_toml("poll_interval_secs = 300").is_err());
    }
}
