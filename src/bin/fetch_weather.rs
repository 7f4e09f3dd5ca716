//! Builds the city weather table from NASA POWER monthly data.

use anyhow::{Context, Result};
use clap::Parser;
use solarcast::domain::ports::WeatherProvider;
use solarcast::infrastructure::NasaPowerClient;
use solarcast::infrastructure::weather_csv::{read_city_locations, write_weather_records};
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Fetch annual weather per city from NASA POWER", long_about = None)]
struct Args {
    /// Coordinates CSV (City,Latitude,Longitude)
    #[arg(short, long, default_value = "data/city_coords.csv")]
    input: PathBuf,

    /// Output weather CSV
    #[arg(short, long, default_value = "data/city_weather.csv")]
    output: PathBuf,

    /// Year to average over
    #[arg(long, default_value_t = 2024)]
    year: i32,

    /// Pause between cities, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pause_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let args = Args::parse();
    let file = File::open(&args.input).with_context(|| format!("Failed to open {:?}", args.input))?;
    let locations = read_city_locations(file)?;
    info!("Found {} cities", locations.len());

    let client = NasaPowerClient::new(Duration::from_secs(30));
    let mut records = Vec::with_capacity(locations.len());

    for (i, location) in locations.iter().enumerate() {
        match client.fetch_annual_weather(location, args.year).await {
            Ok(record) => {
                info!("Done: {}", location.city);
                records.push(record);
            }
            Err(e) => warn!("Failed for {}: {:#}", location.city, e),
        }
        if i + 1 < locations.len() {
            tokio::time::sleep(Duration::from_millis(args.pause_ms)).await;
        }
    }

    let out = File::create(&args.output).with_context(|| format!("Failed to create {:?}", args.output))?;
    write_weather_records(out, &records)?;
    info!("Saved {:?} with {} cities", args.output, records.len());
    Ok(())
}
