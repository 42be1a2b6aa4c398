//! Parsers for raw train ride snapshots.
//!
//! This module turns text cells of the rides snapshot into typed values and
//! decodes the composite journey key.
//!
//! # Parsers
//!
//! - [`journey_id`]: Split `<base_id>-<departure_code>-<stop_number>` keys
//! - [`values`]: Timestamp, number and identifier coercion
//! - [`schema`]: Column names of input and output tables
//! - [`csv_parser`]: Rides DataFrame to records, feature rows to DataFrame
//!
//! # Example
//!
//! ```
//! use rail_features::parsing::journey_id::split_journey_key;
//!
//! let key = split_journey_key("-5516-2407160644-3");
//! assert_eq!(key.base_id.as_deref(), Some("-5516"));
//! assert_eq!(key.stop_number, Some(3));
//! ```

pub mod csv_parser;
pub mod journey_id;
pub mod schema;
pub mod values;


pub use csv_parser::{dataframe_to_records, features_to_dataframe, read_csv_as_text, RawStopRecord};
pub use journey_id::{split_journey_key, ParsedJourneyKey};
