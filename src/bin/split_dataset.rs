//! Offline dataset preparation: train/test splits and raw-file standardization.

use anyhow::Result;
use clap::{Parser, Subcommand};
use solarcast::application::dataset::{
    StratifiedSplitOptions, run_loco_split, run_standardize, run_stratified_split,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "Dataset split and standardization tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// One train/test split stratified by City | Assumed_building_type
    Stratified {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long, default_value = "splits")]
        outdir: PathBuf,

        /// Test fraction, strictly between 0 and 1
        #[arg(long, default_value_t = 0.2)]
        test_size: f64,

        #[arg(long, default_value_t = 404)]
        seed: u64,
    },
    /// One leave-one-city-out split per city
    Loco {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long, default_value = "splits_loco")]
        outdir: PathBuf,
    },
    /// Standardize raw *rooftop*.csv survey files
    Standardize {
        #[arg(short, long)]
        input_dir: PathBuf,

        #[arg(short, long, default_value = "standardized")]
        outdir: PathBuf,
    },
}

fn main() -> Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Stratified {
            input,
            outdir,
            test_size,
            seed,
        } => {
            let manifest =
                run_stratified_split(&input, &outdir, StratifiedSplitOptions { test_size, seed })?;
            info!(
                "Split {} rows -> train {} / test {} (key: {})",
                manifest.rows_total, manifest.train_rows, manifest.test_rows, manifest.stratify_key
            );
        }
        Commands::Loco { input, outdir } => {
            let manifest = run_loco_split(&input, &outdir)?;
            info!("{} LOCO folds written", manifest.cities.len());
        }
        Commands::Standardize { input_dir, outdir } => {
            let written = run_standardize(&input_dir, &outdir)?;
            info!("{} files standardized", written.len());
        }
    }

    Ok(())
}
