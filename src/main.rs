use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use solarcast::application::{PredictionService, ServiceBootstrap};
use solarcast::config::ArtifactEnvConfig;
use solarcast::domain::solar::{PredictionRequest, TILT_RANGE_DEG};
use std::path::{Path, PathBuf};
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "Rooftop solar yield predictions", long_about = None)]
struct Cli {
    /// Model bundle directory (overrides SOLARCAST_MODELS_DIR)
    #[arg(long, global = true)]
    models_dir: Option<PathBuf>,

    /// City weather CSV (overrides SOLARCAST_WEATHER_CSV)
    #[arg(long, global = true)]
    weather_csv: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict annual yield for one rooftop
    Predict {
        #[arg(long)]
        city: String,

        #[arg(long)]
        building_type: String,

        /// Roof tilt in degrees (documented range 0-60)
        #[arg(long)]
        tilt: f64,

        /// Usable surface in m²; prints the total yearly energy as well
        #[arg(long)]
        surface_area: Option<f64>,
    },
    /// List supported cities and building types
    Metadata,
    /// Predict every row of a CSV (city,building_type,tilt)
    Batch {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Debug, Serialize)]
struct BatchRow {
    city: String,
    building_type: String,
    tilt: f64,
    #[serde(rename = "predicted_kWh_per_m2")]
    predicted: Option<f64>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BatchInput {
    city: String,
    building_type: String,
    tilt: f64,
}

fn run_batch(service: &PredictionService, input: &Path, output: &Path) -> Result<()> {
    let mut rdr = csv::Reader::from_path(input).with_context(|| format!("Failed to open {:?}", input))?;
    let requests: Vec<PredictionRequest> = rdr
        .deserialize::<BatchInput>()
        .map(|row| row.map(|r| PredictionRequest::new(r.city, r.building_type, r.tilt)))
        .collect::<Result<_, _>>()
        .context("Failed to parse batch input")?;

    let results = service.predict_batch(&requests);

    let mut wtr = csv::Writer::from_path(output).with_context(|| format!("Failed to create {:?}", output))?;
    let mut failures = 0;
    for (request, result) in requests.into_iter().zip(results) {
        let (predicted, error) = match result {
            Ok(v) => (Some(v), None),
            Err(e) => {
                failures += 1;
                (None, Some(e.to_string()))
            }
        };
        wtr.serialize(BatchRow {
            city: request.city,
            building_type: request.building_type,
            tilt: request.tilt,
            predicted,
            error,
        })?;
    }
    wtr.flush()?;

    if failures > 0 {
        warn!("{} row(s) could not be predicted, see the error column", failures);
    }
    info!("Wrote {:?}", output);
    Ok(())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    let mut config = ArtifactEnvConfig::from_env();
    if let Some(dir) = cli.models_dir {
        config.models_dir = dir;
    }
    if let Some(csv) = cli.weather_csv {
        config.weather_csv = csv;
    }
    let service = ServiceBootstrap::init(&config).context("Failed to load artifacts")?;

    match cli.command {
        Commands::Predict {
            city,
            building_type,
            tilt,
            surface_area,
        } => {
            let per_m2 = service.predict(&city, &building_type, tilt)?;
            println!("Predicted yield: {:.3} kWh/m²/year", per_m2);
            if let Some(area) = surface_area {
                println!("Estimated total: {:.1} kWh/year over {} m²", per_m2 * area, area);
            }
        }
        Commands::Metadata => {
            println!("Cities:");
            for city in service.cities() {
                println!("  {}", city);
            }
            println!("Building types:");
            for bt in service.building_types() {
                println!("  {}", bt);
            }
            println!("Tilt range: {}-{} degrees", TILT_RANGE_DEG[0], TILT_RANGE_DEG[1]);
        }
        Commands::Batch { input, output } => run_batch(&service, &input, &output)?,
    }

    Ok(())
}
