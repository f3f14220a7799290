use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use floodwatch::api::client::FloodClient;
use floodwatch::config::{AppConfig, CONFIG_FILE};
use floodwatch::models::station::StationSnapshot;
use floodwatch::notify::TelegramNotifier;
use floodwatch::poll::PollCoordinator;
use floodwatch::source::FloodSource;

#[derive(Parser)]
#[command(name = "floodwatch", about = "Water-level station monitor for Civil IoT Taiwan")]
struct Cli {
    /// Path to the station config file
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up the API identifiers for a station code
    Resolve {
        /// Externally chosen station code, e.g. from the service's portal
        station_code: String,
    },
    /// Run one fetch cycle and print the station table
    Fetch,
    /// Poll continuously until Ctrl-C
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "floodwatch=info".into()),
        )
        .init();

    // Load .env if present (override system env vars)
    dotenvy::dotenv_override().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve { station_code } => {
            let client = FloodClient::new()?;
            match client.resolve_station(&station_code).await? {
                Some(station) => {
                    println!("\n📍 Station {}", station_code);
                    println!("   thing id:   {}", station.thing_id);
                    println!(
                        "   station id: {}",
                        station.station_id.unwrap_or_else(|| "unknown".into())
                    );
                    println!("\nAdd to {}:", cli.config);
                    println!("[[stations]]");
                    println!("code = \"{}\"", station_code);
                    println!("name = \"...\"");
                    println!("thing_id = {}", station.thing_id);
                }
                None => println!("No station found for code '{}'", station_code),
            }
        }
        Commands::Fetch => {
            let config = AppConfig::load(&cli.config)?;
            let coordinator = build_coordinator(&config)?;
            coordinator.refresh().await;
            match coordinator.snapshot() {
                Some(snapshot) => print_snapshot(&snapshot),
                None => println!("\n⚠️  No data received this cycle"),
            }
        }
        Commands::Run => {
            let config = AppConfig::load(&cli.config)?;
            info!("Tracking {} stations", config.stations.len());
            let coordinator = Arc::new(build_coordinator(&config)?);
            coordinator
                .run(async {
                    tokio::signal::ctrl_c().await.ok();
                })
                .await;
        }
    }

    Ok(())
}

fn build_coordinator(config: &AppConfig) -> Result<PollCoordinator> {
    let client = FloodClient::new()?;
    let source = FloodSource::new(client, &config.stations);
    let notifier = Arc::new(TelegramNotifier::new());
    Ok(PollCoordinator::new(
        Box::new(source),
        notifier,
        Duration::from_secs(config.poll_interval_secs),
        config.max_attempts,
    ))
}

fn print_snapshot(snapshot: &StationSnapshot) {
    println!(
        "\n{:<10} {:<24} {:>12} {:>10} {:>10}  {}",
        "Code", "Name", "Level (cm)", "Lat", "Lon", "Updated"
    );
    println!("{}", "-".repeat(92));

    let mut readings: Vec<_> = snapshot.values().collect();
    readings.sort_by(|a, b| a.station_code.cmp(&b.station_code));

    for r in readings {
        println!(
            "{:<10} {:<24} {:>12} {:>10} {:>10}  {}",
            r.station_code,
            r.station_name.as_deref().unwrap_or("unknown"),
            r.water_level
                .map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| "-".into()),
            r.latitude
                .map(|v| format!("{:.5}", v))
                .unwrap_or_else(|| "unknown".into()),
            r.longitude
                .map(|v| format!("{:.5}", v))
                .unwrap_or_else(|| "unknown".into()),
            r.update_time,
        );
    }

    println!("\nShowing {} stations", snapshot.len());
}
