//! Feature table validation with detailed error and warning reporting.
//!
//! This module checks the journey invariants of a computed feature table:
//! one row per (journey, stop index), stop indices forming a contiguous
//! 1..N range, and distance progress ending at 1 (or 0 for journeys that do
//! not move).

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::algorithms::engine::FeatureRow;
use crate::core::domain::JourneyId;
use crate::parsing::csv_parser::text_column;
use crate::parsing::schema::output;
use crate::transformations::cleaning::validate_schema;

/// Maximum number of individual findings listed per category.
const MAX_LISTED: usize = 5;

/// Validation result with categorized issues and statistics.
///
/// Errors make `is_valid` false, while warnings are informational but don't
/// fail validation.
///
/// # Examples
///
/// ```
/// use rail_features::preprocessing::validator::ValidationResult;
///
/// let mut result = ValidationResult::new();
/// assert!(result.is_valid);
///
/// result.add_error("Duplicate stop".to_string());
/// assert!(!result.is_valid);
/// assert_eq!(result.errors.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: ValidationStats,
}

/// Summary statistics computed during validation.
///
/// # Fields
///
/// * `total_rows` - Rows in the validated table
/// * `journeys` - Distinct journeys
/// * `duplicate_stops` - Rows repeating a (journey, stop index) pair
/// * `non_contiguous_journeys` - Journeys whose indices are not exactly 1..N
/// * `missing_coordinates` - Rows without latitude or longitude
/// * `inconsistent_distances` - Journeys whose last stop does not reach the total distance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationStats {
    pub total_rows: usize,
    pub journeys: usize,
    pub duplicate_stops: usize,
    pub non_contiguous_journeys: usize,
    pub missing_coordinates: usize,
    pub inconsistent_distances: usize,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            stats: ValidationStats::default(),
        }
    }

    /// Adds a critical error and marks the result as invalid.
    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    /// Adds a non-critical warning without invalidating the result.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for journey feature tables.
///
/// Duplicated stops are errors. Gaps in the stop sequence are warnings:
/// they are expected once stops without coordinates have been excluded.
pub struct JourneyValidator;

impl JourneyValidator {
    /// Validates feature rows as produced by the feature engine.
    pub fn validate_rows(rows: &[FeatureRow]) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.stats.total_rows = rows.len();

        let mut journeys: BTreeMap<&JourneyId, Vec<&FeatureRow>> = BTreeMap::new();
        for row in rows {
            journeys.entry(&row.event.journey).or_default().push(row);
            if !row.event.has_coordinates() {
                result.stats.missing_coordinates += 1;
            }
        }
        result.stats.journeys = journeys.len();

        let indices: BTreeMap<String, Vec<u32>> = journeys
            .iter()
            .map(|(id, rows)| (id.to_string(), rows.iter().map(|r| r.event.stop_index).collect()))
            .collect();
        Self::check_stop_indices(&indices, &mut result);

        for (id, rows) in &journeys {
            let Some(last) = rows.iter().max_by_key(|r| r.event.stop_index) else {
                continue;
            };
            let distance = &last.features.distance;
            let reaches_total = (distance.distance_from_origin - distance.total_distance).abs() < 1e-9;
            let progress_ok = distance.distance_progress == 1.0
                || (distance.total_distance == 0.0 && distance.distance_progress == 0.0);
            if !(reaches_total && progress_ok) {
                result.stats.inconsistent_distances += 1;
                if result.stats.inconsistent_distances <= MAX_LISTED {
                    result.add_error(format!(
                        "Journey {} ends at distance progress {}",
                        id, distance.distance_progress
                    ));
                }
            }
        }

        if result.stats.missing_coordinates > 0 {
            result.add_warning(format!(
                "{} rows without coordinates",
                result.stats.missing_coordinates
            ));
        }

        result
    }

    /// Validates a written feature table.
    ///
    /// Requires the `base_id`, `departure_time` and `stop_index` columns.
    pub fn validate_dataframe(df: &DataFrame) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.stats.total_rows = df.height();

        let (has_keys, issues) = validate_schema(
            df,
            &[output::BASE_ID, output::DEPARTURE_TIME, output::STOP_INDEX],
        );
        if !has_keys {
            for issue in issues {
                result.add_error(issue);
            }
            return result;
        }

        let columns = (
            text_column(df, output::BASE_ID),
            text_column(df, output::DEPARTURE_TIME),
            text_column(df, output::STOP_INDEX),
        );
        let (bases, departures, stops) = match columns {
            (Ok(Some(b)), Ok(Some(d)), Ok(Some(s))) => (b, d, s),
            _ => {
                result.add_error("Key columns could not be read as text".to_string());
                return result;
            }
        };

        let mut indices: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        let mut unreadable = 0;
        for i in 0..df.height() {
            let key = format!(
                "{}@{}",
                bases[i].as_deref().unwrap_or_default(),
                departures[i].as_deref().unwrap_or_default()
            );
            match stops[i].as_deref().and_then(|s| s.trim().parse::<u32>().ok()) {
                Some(index) => indices.entry(key).or_default().push(index),
                None => unreadable += 1,
            }
        }
        result.stats.journeys = indices.len();
        if unreadable > 0 {
            result.add_error(format!("{} rows with an unreadable stop_index", unreadable));
        }

        if let (Ok(Some(lats)), Ok(Some(longs))) =
            (text_column(df, output::LAT), text_column(df, output::LONG))
        {
            result.stats.missing_coordinates = lats
                .iter()
                .zip(longs.iter())
                .filter(|(lat, long)| lat.is_none() || long.is_none())
                .count();
        }

        Self::check_stop_indices(&indices, &mut result);
        result
    }

    fn check_stop_indices(journeys: &BTreeMap<String, Vec<u32>>, result: &mut ValidationResult) {
        for (id, indices) in journeys {
            let mut seen = HashSet::new();
            let duplicates = indices.iter().filter(|i| !seen.insert(**i)).count();
            if duplicates > 0 {
                result.stats.duplicate_stops += duplicates;
                result.add_error(format!("Journey {} has {} duplicated stops", id, duplicates));
            }

            let mut sorted: Vec<u32> = seen.into_iter().collect();
            sorted.sort_unstable();
            let contiguous = sorted
                .iter()
                .enumerate()
                .all(|(position, index)| *index as usize == position + 1);
            if !contiguous {
                result.stats.non_contiguous_journeys += 1;
                if result.stats.non_contiguous_journeys <= MAX_LISTED {
                    result.add_warning(format!("Journey {} has gaps in its stop indices", id));
                }
            }
        }

        if result.stats.non_contiguous_journeys > MAX_LISTED {
            result.add_warning(format!(
                "Total journeys with gaps: {} (showing first {})",
                result.stats.non_contiguous_journeys, MAX_LISTED
            ));
        }
    }
}
