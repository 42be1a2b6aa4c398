//! Feature engineering for train stop events.
//!
//! Turns a raw snapshot of observed train stops into a per-stop feature
//! table: journeys are rebuilt from their station paths, stops are located,
//! and lag, progress and distance features are computed within each journey.
//!
//! The usual entry point is [`FeaturePipeline`]:
//!
//! ```no_run
//! use rail_features::io::ReferenceTables;
//! use rail_features::logging::RunLog;
//! use rail_features::FeaturePipeline;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let tables = ReferenceTables::load(Some(Path::new("ibnr_stations_index.csv")), None, None, "DE")?;
//! let output = FeaturePipeline::new().process_file(
//!     Path::new("DBtrainrides.csv"),
//!     tables,
//!     &RunLog::new("rides"),
//! )?;
//! println!("{} feature rows", output.report.rows_out);
//! # Ok(())
//! # }
//! ```

pub mod algorithms;
pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod logging;
pub mod parsing;
pub mod preprocessing;
pub mod transformations;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use preprocessing::{build_features, FeaturePipeline, PipelineOutput, PipelineReport};
