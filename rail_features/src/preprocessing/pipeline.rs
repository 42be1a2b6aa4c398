use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::algorithms::engine::{EngineStats, FeatureEngine};
use crate::config::{CanceledFilter, DelayImputation, PipelineSettings};
use crate::core::domain::StopEvent;
use crate::error::PipelineError;
use crate::io::loaders::{ReferenceTables, RidesLoader};
use crate::logging::RunLog;
use crate::parsing::csv_parser;
use crate::parsing::schema::{output, raw};
use crate::preprocessing::enricher::FeatureEnricher;
use crate::preprocessing::geo_resolver::{GeoResolver, GeoStats, Geocoder};
use crate::preprocessing::info_messages::mean_delay_by_message;
use crate::preprocessing::path_expander::{station_counts, ExpansionStats, PathExpander};
use crate::preprocessing::train_type::TrainTypeClassifier;
use crate::preprocessing::validator::{JourneyValidator, ValidationResult};
use crate::transformations::{drop_columns, filter_canceled, ordinal_encode};

/// Counters and findings of one pipeline run
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    pub run: String,
    pub rows_in: usize,
    pub expansion: ExpansionStats,
    pub canceled_removed: usize,
    pub geo: GeoStats,
    pub imputed_delays: usize,
    pub engine: EngineStats,
    pub validation: ValidationResult,
    /// Mean arrival delay and row count per normalized info message
    pub mean_delay_by_message: BTreeMap<String, (f64, usize)>,
    pub rows_out: usize,
    pub columns_out: usize,
}

/// Result of a pipeline run
pub struct PipelineOutput {
    pub dataframe: DataFrame,
    pub report: PipelineReport,
}

/// Main feature pipeline
pub struct FeaturePipeline {
    settings: PipelineSettings,
    geocoder: Option<Box<dyn Geocoder>>,
}

impl FeaturePipeline {
    /// Create a new pipeline with default settings
    pub fn new() -> Self {
        Self::with_settings(PipelineSettings::default())
    }

    /// Create a pipeline with custom settings
    pub fn with_settings(settings: PipelineSettings) -> Self {
        Self {
            settings,
            geocoder: None,
        }
    }

    /// Use a geocoder as the last step of coordinate resolution
    pub fn with_geocoder(mut self, geocoder: Box<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Process a rides CSV file into the feature table
    pub fn process_file(
        self,
        rides_path: &Path,
        tables: ReferenceTables,
        log: &RunLog,
    ) -> Result<PipelineOutput> {
        let rides = RidesLoader::load_from_csv(rides_path)?;
        log.stage("Loader").info(format!(
            "{} rows loaded from {}",
            rides.num_rows,
            rides_path.display()
        ));
        self.process(&rides.dataframe, tables, log)
    }

    /// Process a rides snapshot into the feature table
    ///
    /// # Arguments
    /// * `rides` - Raw snapshot, any column types (cells are coerced from text)
    /// * `tables` - Station index and coordinate reference tables
    /// * `log` - Logging handle of this run
    ///
    /// # Returns
    /// PipelineOutput with the feature DataFrame and the run report. Fails
    /// only when required columns are missing or a table operation fails.
    pub fn process(
        self,
        rides: &DataFrame,
        tables: ReferenceTables,
        log: &RunLog,
    ) -> Result<PipelineOutput> {
        let mut report = PipelineReport {
            run: log.run().to_string(),
            rows_in: rides.height(),
            ..PipelineReport::default()
        };

        // Step 1: Schema check
        let missing = csv_parser::missing_rides_columns(rides, self.settings.expand_paths);
        if !missing.is_empty() {
            return Err(PipelineError::MissingColumns(missing).into());
        }
        let records =
            csv_parser::dataframe_to_records(rides).context("Failed to read rides snapshot")?;

        let stage = log.stage("PathExpander");
        for (station, count) in station_counts(&records).iter().take(5) {
            stage.debug(format!("origin station {} appears in {} records", station, count));
        }

        // Step 2: Journey reconstruction
        let (mut events, expansion) = PathExpander::new(&tables.stations)
            .with_expansion(self.settings.expand_paths)
            .with_path_column(csv_parser::has_column(rides, raw::PATH))
            .expand(records, &stage);
        report.expansion = expansion;

        // Step 3: Canceled stops before features
        if self.settings.canceled_filter == CanceledFilter::BeforeFeatures {
            let before = events.len();
            events.retain(|e| !e.canceled);
            report.canceled_removed = before - events.len();
            log.stage("CanceledFilter")
                .info(format!("{} canceled stops removed", report.canceled_removed));
        }

        // Step 4: Coordinates
        let mut resolver = GeoResolver::new(tables.european_stations, tables.manual_coordinates);
        if let Some(geocoder) = self.geocoder {
            resolver = resolver.with_geocoder(geocoder);
        }
        report.geo = resolver.resolve(&mut events, &log.stage("GeoResolver"));

        // Step 5: Delay imputation
        if self.settings.delay_imputation == DelayImputation::Zero {
            report.imputed_delays = impute_zero_delays(&mut events);
        }

        // Step 6: Windowed features
        let engine_output = FeatureEngine::new().compute(events);
        report.engine = engine_output.stats;
        log_engine_stats(&report.engine, log);

        // Step 7: Validate
        report.validation = JourneyValidator::validate_rows(&engine_output.rows);
        let stage = log.stage("Validator");
        for warning in &report.validation.warnings {
            stage.warn(warning);
        }
        for error in &report.validation.errors {
            stage.warn(format!("invariant violated: {}", error));
        }

        // Step 8: Messages and train types
        let enricher = if self.settings.classify_train_types {
            FeatureEnricher::with_classifier(TrainTypeClassifier::new(
                self.settings.tram_threshold_km,
            ))
        } else {
            FeatureEnricher::new()
        };
        let enriched = enricher.enrich(engine_output.rows);
        report.mean_delay_by_message = mean_delay_by_message(
            enriched
                .iter()
                .map(|e| (&e.message, e.row.event.arrival_delay)),
        );

        // Step 9: Table transformations
        let mut df = csv_parser::features_to_dataframe(&enriched)
            .context("Failed to convert features to DataFrame")?;
        df = ordinal_encode(
            &df,
            output::TRANSFORMED_INFO_MESSAGE,
            output::INFO_LABEL_ENCODED,
            &self.settings.message_order,
        )?;

        df = match self.settings.canceled_filter {
            CanceledFilter::BeforeFeatures => df.drop(output::CANCELED)?,
            CanceledFilter::AfterFeatures => {
                let kept = filter_canceled(&df)?;
                report.canceled_removed = df.height() - kept.height();
                log.stage("CanceledFilter")
                    .info(format!("{} canceled rows removed", report.canceled_removed));
                kept
            }
            CanceledFilter::Keep => df,
        };
        df = drop_columns(&df, &self.settings.drop_columns)?;

        report.rows_out = df.height();
        report.columns_out = df.width();
        log.stage("Pipeline").info(format!(
            "{} rows in, {} feature rows out ({} columns)",
            report.rows_in, report.rows_out, report.columns_out
        ));

        Ok(PipelineOutput {
            dataframe: df,
            report,
        })
    }
}

impl Default for FeaturePipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace missing delays with 0; returns the number of values filled
fn impute_zero_delays(events: &mut [StopEvent]) -> usize {
    let mut filled = 0;
    for event in events.iter_mut() {
        for delay in [&mut event.arrival_delay, &mut event.departure_delay] {
            if delay.is_none() {
                *delay = Some(0.0);
                filled += 1;
            }
        }
    }
    filled
}

fn log_engine_stats(stats: &EngineStats, log: &RunLog) {
    let stage = log.stage("FeatureEngine");
    stage.info(format!(
        "{} journeys, {} of {} stops kept",
        stats.journeys, stats.rows_out, stats.rows_in
    ));
    if stats.missing_coordinates > 0 {
        stage.warn(format!(
            "{} stops without coordinates excluded ({} journeys lost entirely)",
            stats.missing_coordinates, stats.dropped_journeys
        ));
    }
    if stats.duplicate_stops > 0 {
        stage.warn(format!("{} duplicate stops dropped", stats.duplicate_stops));
    }
    if stats.single_stop_journeys > 0 {
        stage.debug(format!("{} single-stop journeys", stats.single_stop_journeys));
    }
}

/// Convenience function to build the feature table from a rides file
pub fn build_features(
    rides_path: &Path,
    tables: ReferenceTables,
    settings: PipelineSettings,
) -> Result<PipelineOutput> {
    let log = RunLog::new(
        rides_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("run"),
    );
    FeaturePipeline::with_settings(settings).process_file(rides_path, tables, &log)
}
