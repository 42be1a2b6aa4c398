//! High-level data loading and writing utilities.
//!
//! These loaders combine CSV parsing with construction of the lookup tables
//! and add file context to every error.
//!
//! # Example
//!
//! ```no_run
//! use rail_features::io::loaders::{ReferenceTables, RidesLoader};
//! use std::path::Path;
//!
//! let rides = RidesLoader::load_from_csv(Path::new("DBtrainrides.csv"))
//!     .expect("Failed to load");
//! let tables = ReferenceTables::load(Some(Path::new("ibnr_stations_index.csv")), None, None, "DE")
//!     .expect("Failed to load tables");
//! println!("Loaded {} rows, {} stations", rides.num_rows, tables.stations.len());
//! ```

pub mod loaders;


pub use loaders::{
    write_csv, write_json, write_train_type_splits, ReferenceTables, RidesLoadResult, RidesLoader,
};
