//! Build the per-stop feature table from a raw rides snapshot.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;

use rail_features::config::PipelineConfig;
use rail_features::io::{write_csv, write_json, write_train_type_splits, ReferenceTables};
use rail_features::logging::RunLog;
use rail_features::FeaturePipeline;

#[derive(Parser, Debug)]
#[command(
    name = "build-features",
    author,
    version,
    about = "Compute per-stop train delay features from a rides snapshot",
    long_about = "Rebuilds journeys from the station paths of a rides snapshot, resolves \
                  stop coordinates, and writes one feature row per located stop.\n\n\
                  Command line flags override the values of the configuration file."
)]
struct Args {
    /// Raw rides CSV
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output CSV for the feature table
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML configuration file (defaults to rail_features.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Station name to IBNR index CSV
    #[arg(long)]
    stations: Option<PathBuf>,

    /// European station coordinates CSV
    #[arg(long)]
    european_stations: Option<PathBuf>,

    /// Manually collected coordinates CSV
    #[arg(long)]
    coordinates: Option<PathBuf>,

    /// Write the run report as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Also write one CSV per train type into this directory
    #[arg(long, value_name = "DIR")]
    split_by_train_type: Option<PathBuf>,

    /// Treat every record as one stop instead of expanding paths
    #[arg(long)]
    no_expand: bool,

    /// Verbose output (show debug messages)
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(args: &Args) -> Result<PipelineConfig> {
    if let Some(path) = &args.config {
        return PipelineConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()));
    }
    match PipelineConfig::from_default_location() {
        Ok(config) => Ok(config),
        Err(e) => {
            log::debug!("Using default settings: {}", e);
            Ok(PipelineConfig::default())
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .format_timestamp(None)
    .init();

    let mut config = load_config(&args)?;
    let input = args.input.clone().or(config.input.rides.take());
    let output = args.output.clone().or(config.output.features.take());
    let (Some(input), Some(output)) = (input, output) else {
        bail!("Both an input and an output file are required (flags or config)");
    };
    if !input.exists() {
        bail!("Input file does not exist: {}", input.display());
    }
    if args.no_expand {
        config.pipeline.expand_paths = false;
    }

    let stations = args.stations.clone().or(config.input.stations.take());
    let european = args.european_stations.clone().or(config.input.european_stations.take());
    let manual = args.coordinates.clone().or(config.input.manual_coordinates.take());
    let report_path = args.report.clone().or(config.output.report.take());
    let split_dir = args
        .split_by_train_type
        .clone()
        .or(config.output.train_type_dir.take());

    log::info!("=== Train Stop Feature Builder ===");
    log::info!("Input: {}", input.display());
    log::info!("Output: {}", output.display());

    let tables = ReferenceTables::load(
        stations.as_deref(),
        european.as_deref(),
        manual.as_deref(),
        &config.pipeline.country_filter,
    )
    .context("Failed to load reference tables")?;
    log::info!(
        "Reference tables: {} stations, {} European coordinates, {} manual coordinates",
        tables.stations.len(),
        tables.european_stations.len(),
        tables.manual_coordinates.len()
    );

    let run = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("rides")
        .to_string();
    let log = RunLog::new(run);
    let mut result = FeaturePipeline::with_settings(config.pipeline)
        .process_file(&input, tables, &log)?;

    write_csv(&mut result.dataframe, &output)?;
    log::info!(
        "Wrote {} rows x {} columns to {}",
        result.report.rows_out,
        result.report.columns_out,
        output.display()
    );

    if let Some(dir) = split_dir {
        for path in write_train_type_splits(&result.dataframe, &dir)? {
            log::info!("Train type split: {}", path.display());
        }
    }

    if let Some(path) = report_path {
        write_json(&result.report, &path)?;
        log::info!("Report: {}", path.display());
    }

    if !result.report.validation.is_valid {
        log::warn!(
            "{} feature invariants violated, see the report for details",
            result.report.validation.errors.len()
        );
    }

    Ok(())
}
