//! Resolves city names to coordinates through Nominatim.

use anyhow::{Context, Result};
use clap::Parser;
use solarcast::application::geocoding::resolve_cities;
use solarcast::infrastructure::NominatimClient;
use solarcast::infrastructure::weather_csv::write_city_locations;
use std::fs::{self, File};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Geocode city names to City,Latitude,Longitude", long_about = None)]
struct Args {
    /// City names to resolve
    cities: Vec<String>,

    /// File with one city name per line, appended to the positional list
    #[arg(long)]
    cities_file: Option<PathBuf>,

    /// Output coordinates CSV
    #[arg(short, long, default_value = "data/city_coords.csv")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let args = Args::parse();
    let mut cities = args.cities;
    if let Some(path) = &args.cities_file {
        let content = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        cities.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from),
        );
    }
    if cities.is_empty() {
        anyhow::bail!("No city names given");
    }

    let geocoder = NominatimClient::new(Duration::from_secs(30));
    // Nominatim usage policy: at most one request per second
    let locations = resolve_cities(&geocoder, &cities, Duration::from_secs(1)).await;

    let out = File::create(&args.output).with_context(|| format!("Failed to create {:?}", args.output))?;
    write_city_locations(out, &locations)?;
    info!("Saved {:?} ({} of {} cities resolved)", args.output, locations.len(), cities.len());
    Ok(())
}
