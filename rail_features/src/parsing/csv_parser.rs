use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use polars::prelude::*;
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};
use crate::parsing::journey_id::{split_journey_key, ParsedJourneyKey};
use crate::parsing::schema::{output, raw};
use crate::parsing::values::{
    format_timestamp, non_empty, normalize_identifier, parse_flag, parse_number, parse_timestamp,
};
use crate::preprocessing::enricher::EnrichedStop;

/// One row of the raw rides snapshot after type coercion.
///
/// The key stays in parsed-but-unvalidated form; rows whose key is unusable
/// are separated out by the pipeline before any grouping happens.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawStopRecord {
    pub row: usize,
    pub key: ParsedJourneyKey,
    pub path: Option<String>,
    pub station_id: Option<String>,
    pub station_name: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub line: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub arrival_planned: Option<NaiveDateTime>,
    pub departure_planned: Option<NaiveDateTime>,
    pub arrival_delay: Option<f64>,
    pub departure_delay: Option<f64>,
    pub info: Option<String>,
    /// Explicit cancellation flag of pre-expanded snapshots.
    pub canceled: Option<bool>,
}

/// Read a CSV file into a DataFrame with every column kept as text.
///
/// Type inference is disabled on purpose: delay columns mix numbers with
/// `NA`, ids look numeric, and coercion is done per cell afterwards.
pub fn read_csv_as_text(csv_path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(csv_path.into()))
        .with_context(|| format!("Failed to open CSV file: {}", csv_path.display()))?
        .finish()
        .with_context(|| format!("Failed to parse CSV file: {}", csv_path.display()))?;

    Ok(df)
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Extract a column as owned text cells, or `None` when the column is absent.
pub fn text_column(df: &DataFrame, name: &str) -> PolarsResult<Option<Vec<Option<String>>>> {
    if !has_column(df, name) {
        return Ok(None);
    }
    let column = df.column(name)?.cast(&DataType::String)?;
    let values = column
        .str()?
        .into_iter()
        .map(|v| non_empty(v).map(str::to_string))
        .collect();
    Ok(Some(values))
}

/// Names of the required columns missing from a rides snapshot.
///
/// The key is satisfied either by the composite `ID` column or by all three
/// pre-split key columns.
pub fn missing_rides_columns(df: &DataFrame, require_path: bool) -> Vec<String> {
    let mut missing = Vec::new();

    let has_split_key = raw::SPLIT_KEY.iter().all(|c| has_column(df, c));
    if !has_column(df, raw::ID) && !has_split_key {
        missing.push(raw::ID.to_string());
    }

    for name in raw::REQUIRED {
        if !has_column(df, name) {
            missing.push(name.to_string());
        }
    }

    if require_path && !has_column(df, raw::PATH) {
        missing.push(raw::PATH.to_string());
    }

    missing
}

/// Convert a rides snapshot DataFrame into raw stop records.
///
/// Fails only on schema problems; every cell-level problem becomes `None`.
pub fn dataframe_to_records(df: &DataFrame) -> PipelineResult<Vec<RawStopRecord>> {
    let missing = missing_rides_columns(df, false);
    if !missing.is_empty() {
        return Err(PipelineError::MissingColumns(missing));
    }

    let height = df.height();
    let column = |name: &str| -> PipelineResult<Vec<Option<String>>> {
        Ok(text_column(df, name)?.unwrap_or_else(|| vec![None; height]))
    };

    let keys: Vec<ParsedJourneyKey> = if has_column(df, raw::ID) {
        column(raw::ID)?
            .iter()
            .map(|id| id.as_deref().map(split_journey_key).unwrap_or_default())
            .collect()
    } else {
        let bases = column(raw::ID_BASE)?;
        let codes = column(raw::ID_TIMESTAMP)?;
        let stops = column(raw::ID_STOP_NUMBER)?;
        (0..height)
            .map(|i| {
                ParsedJourneyKey::from_parts(
                    bases[i].as_deref(),
                    codes[i].as_deref(),
                    stops[i].as_deref(),
                )
            })
            .collect()
    };

    let paths = column(raw::PATH)?;
    let eva_nrs = column(raw::EVA_NR)?;
    let stations = column(raw::STATION)?;
    let cities = column(raw::CITY)?;
    let zips = column(raw::ZIP)?;
    let lines = column(raw::LINE)?;
    let lats = column(raw::LAT)?;
    let longs = column(raw::LONG)?;
    let arrival_plans = column(raw::ARRIVAL_PLAN)?;
    let departure_plans = column(raw::DEPARTURE_PLAN)?;
    let arrival_delays = column(raw::ARRIVAL_DELAY)?;
    let departure_delays = column(raw::DEPARTURE_DELAY)?;
    let infos = column(raw::INFO)?;
    let canceled = column(raw::CANCELED)?;

    let number = |cell: &Option<String>| cell.as_deref().and_then(parse_number);
    let timestamp = |cell: &Option<String>| cell.as_deref().and_then(parse_timestamp);

    let records = keys
        .into_iter()
        .enumerate()
        .map(|(i, key)| RawStopRecord {
            row: i,
            key,
            path: paths[i].clone(),
            station_id: eva_nrs[i].as_deref().and_then(normalize_identifier),
            station_name: stations[i].clone(),
            city: cities[i].clone(),
            zip: zips[i].clone(),
            line: lines[i].clone(),
            latitude: number(&lats[i]),
            longitude: number(&longs[i]),
            arrival_planned: timestamp(&arrival_plans[i]),
            departure_planned: timestamp(&departure_plans[i]),
            arrival_delay: number(&arrival_delays[i]),
            departure_delay: number(&departure_delays[i]),
            info: infos[i].clone(),
            canceled: canceled[i].as_deref().and_then(parse_flag),
        })
        .collect();

    Ok(records)
}

/// Convert enriched stops into the output feature table.
pub fn features_to_dataframe(rows: &[EnrichedStop]) -> PolarsResult<DataFrame> {
    let n = rows.len();
    let ts = |value: &Option<NaiveDateTime>| value.as_ref().map(format_timestamp);

    let mut base_ids = Vec::with_capacity(n);
    let mut departure_times = Vec::with_capacity(n);
    let mut stop_indices = Vec::with_capacity(n);
    let mut station_names = Vec::with_capacity(n);
    let mut station_ids = Vec::with_capacity(n);
    let mut origin_station_ids = Vec::with_capacity(n);
    let mut lines = Vec::with_capacity(n);
    let mut cities = Vec::with_capacity(n);
    let mut zips = Vec::with_capacity(n);
    let mut lats = Vec::with_capacity(n);
    let mut longs = Vec::with_capacity(n);
    let mut arrival_plans = Vec::with_capacity(n);
    let mut departure_plans = Vec::with_capacity(n);
    let mut arrival_delays = Vec::with_capacity(n);
    let mut departure_delays = Vec::with_capacity(n);
    let mut infos = Vec::with_capacity(n);
    let mut canceled = Vec::with_capacity(n);

    let mut prev_arrival_delays = Vec::with_capacity(n);
    let mut prev_departure_delays = Vec::with_capacity(n);
    let mut weighted_avg_prev_delays = Vec::with_capacity(n);
    let mut cumulative_delays = Vec::with_capacity(n);
    let mut delay_gains = Vec::with_capacity(n);

    let mut max_stop_indices = Vec::with_capacity(n);
    let mut station_progresses = Vec::with_capacity(n);
    let mut origin_departures = Vec::with_capacity(n);
    let mut elapsed_times = Vec::with_capacity(n);
    let mut total_times = Vec::with_capacity(n);
    let mut time_progresses = Vec::with_capacity(n);
    let mut progress_ratios = Vec::with_capacity(n);
    let mut next_arrivals = Vec::with_capacity(n);
    let mut travel_times = Vec::with_capacity(n);

    let mut to_prev = Vec::with_capacity(n);
    let mut to_next = Vec::with_capacity(n);
    let mut from_origin = Vec::with_capacity(n);
    let mut totals = Vec::with_capacity(n);
    let mut distance_progresses = Vec::with_capacity(n);
    let mut city_delays = Vec::with_capacity(n);

    let mut info_present = Vec::with_capacity(n);
    let mut messages = Vec::with_capacity(n);
    let mut line_categories = Vec::with_capacity(n);
    let mut avg_distances = Vec::with_capacity(n);
    let mut train_types = Vec::with_capacity(n);

    for enriched in rows {
        let event = &enriched.row.event;
        let delay = &enriched.row.features.delay;
        let time = &enriched.row.features.time;
        let distance = &enriched.row.features.distance;

        base_ids.push(event.journey.base_id.clone());
        departure_times.push(format_timestamp(&event.journey.scheduled_departure));
        stop_indices.push(event.stop_index);
        station_names.push(event.station_name.clone());
        station_ids.push(event.station_id.clone());
        origin_station_ids.push(event.origin_station_id.clone());
        lines.push(event.line.clone());
        cities.push(event.city.clone());
        zips.push(event.zip.clone());
        lats.push(event.latitude);
        longs.push(event.longitude);
        arrival_plans.push(ts(&event.arrival_planned));
        departure_plans.push(ts(&event.departure_planned));
        arrival_delays.push(event.arrival_delay);
        departure_delays.push(event.departure_delay);
        infos.push(event.info.clone());
        canceled.push(event.canceled);

        prev_arrival_delays.push(delay.prev_arrival_delay);
        prev_departure_delays.push(delay.prev_departure_delay);
        weighted_avg_prev_delays.push(delay.weighted_avg_prev_delay);
        cumulative_delays.push(delay.cumulative_delay);
        delay_gains.push(delay.delay_gain);

        max_stop_indices.push(time.max_stop_index);
        station_progresses.push(time.station_progress);
        origin_departures.push(ts(&time.origin_departure));
        elapsed_times.push(time.planned_elapsed_time);
        total_times.push(time.total_planned_time);
        time_progresses.push(time.time_progress);
        progress_ratios.push(time.progress_ratio);
        next_arrivals.push(ts(&time.next_arrival_plan));
        travel_times.push(time.planned_travel_time_to_next_stop);

        to_prev.push(distance.distance_to_prev_stop);
        to_next.push(distance.distance_to_next_stop);
        from_origin.push(distance.distance_from_origin);
        totals.push(distance.total_distance);
        distance_progresses.push(distance.distance_progress);
        city_delays.push(enriched.row.features.avg_city_delay);

        info_present.push(enriched.message.present);
        messages.push(enriched.message.text.clone());
        line_categories.push(
            enriched
                .train_type
                .as_ref()
                .map(|t| t.line_category.label().to_string()),
        );
        avg_distances.push(
            enriched
                .train_type
                .as_ref()
                .and_then(|t| t.avg_distance_between_stops),
        );
        train_types.push(
            enriched
                .train_type
                .as_ref()
                .map(|t| t.final_label().to_string()),
        );
    }

    df!(
        output::BASE_ID => base_ids,
        output::DEPARTURE_TIME => departure_times,
        output::STOP_INDEX => stop_indices,
        output::STATION_NAME => station_names,
        output::STATION_ID => station_ids,
        output::ORIGIN_STATION_ID => origin_station_ids,
        output::LINE => lines,
        output::CITY => cities,
        output::ZIP => zips,
        output::LAT => lats,
        output::LONG => longs,
        output::ARRIVAL_PLAN => arrival_plans,
        output::DEPARTURE_PLAN => departure_plans,
        output::ARRIVAL_DELAY => arrival_delays,
        output::DEPARTURE_DELAY => departure_delays,
        output::INFO => infos,
        output::CANCELED => canceled,
        output::PREV_ARRIVAL_DELAY => prev_arrival_delays,
        output::PREV_DEPARTURE_DELAY => prev_departure_delays,
        output::WEIGHTED_AVG_PREV_DELAY => weighted_avg_prev_delays,
        output::CUMULATIVE_DELAY => cumulative_delays,
        output::DELAY_GAIN => delay_gains,
        output::MAX_STOP_INDEX => max_stop_indices,
        output::STATION_PROGRESS => station_progresses,
        output::ORIGIN_DEPARTURE_PLAN => origin_departures,
        output::PLANNED_ELAPSED_TIME => elapsed_times,
        output::TOTAL_PLANNED_TIME => total_times,
        output::TIME_PROGRESS => time_progresses,
        output::PROGRESS_RATIO => progress_ratios,
        output::NEXT_ARRIVAL_PLAN => next_arrivals,
        output::PLANNED_TRAVEL_TIME_TO_NEXT_STOP => travel_times,
        output::DISTANCE_TO_PREV_STOP => to_prev,
        output::DISTANCE_TO_NEXT_STOP => to_next,
        output::DISTANCE_FROM_ORIGIN => from_origin,
        output::TOTAL_DISTANCE => totals,
        output::DISTANCE_PROGRESS => distance_progresses,
        output::AVG_CITY_DELAY => city_delays,
        output::INFO_PRESENT => info_present,
        output::TRANSFORMED_INFO_MESSAGE => messages,
        output::LINE_CATEGORY => line_categories,
        output::AVG_DISTANCE_BETWEEN_STOPS => avg_distances,
        output::FINAL_TRAIN_TYPE => train_types,
    )
}
