//! Table-level transformations applied after feature computation.
//!
//! # Modules
//!
//! - [`cleaning`]: Drop columns, filter canceled rows, validate schemas
//! - [`encoding`]: Ordinal encoding of ordered categories
//! - [`splitting`]: One table per value of a label column
//!
//! # Example
//!
//! ```no_run
//! use rail_features::transformations::{filter_canceled, ordinal_encode, MESSAGE_ORDER};
//! use polars::prelude::*;
//!
//! # fn example(df: DataFrame) -> Result<(), PolarsError> {
//! let kept = filter_canceled(&df)?;
//! let order: Vec<String> = MESSAGE_ORDER.iter().map(|s| s.to_string()).collect();
//! let encoded = ordinal_encode(&kept, "transformed_info_message", "info_label_encoded", &order)?;
//! # Ok(())
//! # }
//! ```

pub mod cleaning;
pub mod encoding;
pub mod splitting;

pub use cleaning::{drop_columns, filter_canceled, validate_schema};
pub use encoding::{ordinal_code, ordinal_encode, MESSAGE_ORDER};
pub use splitting::{label_file_stem, split_by_column};
