use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::parsing::csv_parser;
use crate::parsing::schema::output;
use crate::preprocessing::geo_resolver::CoordinateTable;
use crate::preprocessing::path_expander::StationIndex;
use crate::transformations::splitting::{label_file_stem, split_by_column};

/// Result of loading a rides snapshot
#[derive(Debug)]
pub struct RidesLoadResult {
    pub dataframe: DataFrame,
    pub num_rows: usize,
}

impl RidesLoadResult {
    pub fn new(dataframe: DataFrame) -> Self {
        let num_rows = dataframe.height();
        Self {
            dataframe,
            num_rows,
        }
    }
}

/// Loader for raw rides snapshots
pub struct RidesLoader;

impl RidesLoader {
    /// Load a rides snapshot from a CSV file, every column as text
    pub fn load_from_csv(csv_path: &Path) -> Result<RidesLoadResult> {
        let df = csv_parser::read_csv_as_text(csv_path).context("Failed to load rides CSV")?;
        Ok(RidesLoadResult::new(df))
    }
}

/// Lookup tables used to resolve station ids and coordinates
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    pub stations: StationIndex,
    pub european_stations: CoordinateTable,
    pub manual_coordinates: CoordinateTable,
}

impl ReferenceTables {
    /// Load whichever tables are given; absent ones stay empty
    pub fn load(
        stations: Option<&Path>,
        european_stations: Option<&Path>,
        manual_coordinates: Option<&Path>,
        country: &str,
    ) -> Result<Self> {
        let mut tables = Self::default();

        if let Some(path) = stations {
            let df = csv_parser::read_csv_as_text(path)?;
            tables.stations = StationIndex::from_dataframe(&df)
                .with_context(|| format!("Invalid station index: {}", path.display()))?;
        }

        if let Some(path) = european_stations {
            let df = csv_parser::read_csv_as_text(path)?;
            tables.european_stations = CoordinateTable::from_european_stations(&df, country)
                .with_context(|| format!("Invalid European station table: {}", path.display()))?;
        }

        if let Some(path) = manual_coordinates {
            let df = csv_parser::read_csv_as_text(path)?;
            tables.manual_coordinates = CoordinateTable::from_manual_coordinates(&df)
                .with_context(|| format!("Invalid coordinate table: {}", path.display()))?;
        }

        Ok(tables)
    }
}

/// Write a DataFrame to CSV, creating parent directories as needed
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    create_parent_dir(path)?;
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
    Ok(())
}

/// Write any serializable report as pretty JSON
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    create_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    Ok(())
}

/// Write one CSV per final train type into `dir`, e.g. `tram.csv`
///
/// Returns the written paths. Rows without a train type are not written.
pub fn write_train_type_splits(df: &DataFrame, dir: &Path) -> Result<Vec<PathBuf>> {
    let parts = split_by_column(df, output::FINAL_TRAIN_TYPE)
        .context("Failed to split features by train type")?;

    let mut written = Vec::with_capacity(parts.len());
    for (label, mut part) in parts {
        let path = dir.join(format!("{}.csv", label_file_stem(&label)));
        write_csv(&mut part, &path)?;
        written.push(path);
    }
    Ok(written)
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}
