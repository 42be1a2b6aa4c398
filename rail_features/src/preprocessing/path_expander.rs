//! Reconstruction of journeys from pipe-delimited station paths.
//!
//! A raw snapshot holds one record per observed stop, but only the terminal
//! record of a journey (the one with the highest stop number) carries the
//! full `|`-separated path. The expander turns that path into one
//! [`StopEvent`] per segment and joins the per-stop attributes back from the
//! record with the matching stop number.

use polars::prelude::DataFrame;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use crate::core::domain::{JourneyId, StopEvent};
use crate::error::{PipelineError, PipelineResult};
use crate::logging::StageLog;
use crate::parsing::csv_parser::{text_column, RawStopRecord};
use crate::parsing::schema::station_index;
use crate::parsing::values::{normalize_identifier, normalize_station_name};

/// Station name to station identifier (IBNR) lookup.
///
/// Names are matched after trimming and lowercasing; the first entry wins
/// when a name repeats.
#[derive(Debug, Clone, Default)]
pub struct StationIndex {
    by_name: HashMap<String, String>,
}

impl StationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, N, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, S)>,
        N: AsRef<str>,
        S: AsRef<str>,
    {
        let mut index = Self::new();
        for (name, id) in pairs {
            index.insert(name.as_ref(), id.as_ref());
        }
        index
    }

    /// Builds the index from a table with `Station Name` and `IBNR` columns.
    pub fn from_dataframe(df: &DataFrame) -> PipelineResult<Self> {
        let names = text_column(df, station_index::STATION_NAME)?;
        let ids = text_column(df, station_index::IBNR)?;
        let (names, ids) = match (names, ids) {
            (Some(names), Some(ids)) => (names, ids),
            (names, ids) => {
                let mut missing = Vec::new();
                if names.is_none() {
                    missing.push(station_index::STATION_NAME.to_string());
                }
                if ids.is_none() {
                    missing.push(station_index::IBNR.to_string());
                }
                return Err(PipelineError::MissingColumns(missing));
            }
        };

        let mut index = Self::new();
        for (name, id) in names.iter().zip(ids.iter()) {
            if let (Some(name), Some(id)) = (name, id) {
                index.insert(name, id);
            }
        }
        Ok(index)
    }

    pub fn insert(&mut self, name: &str, id: &str) {
        if let (Some(key), Some(id)) = (normalize_station_name(name), normalize_identifier(id)) {
            self.by_name.entry(key).or_insert(id);
        }
    }

    pub fn resolve(&self, name: &str) -> Option<&str> {
        let key = normalize_station_name(name)?;
        self.by_name.get(&key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Counters reported by one expansion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpansionStats {
    pub records_in: usize,
    /// Records whose journey key did not parse; excluded from grouping.
    pub invalid_keys: usize,
    pub journeys: usize,
    pub stops_out: usize,
    /// Records not matched to any expanded stop.
    pub intermediate_records: usize,
    pub unresolved_stations: usize,
    pub canceled_journeys: usize,
    pub canceled_stops: usize,
}

/// Expands raw records into stop events, one journey at a time.
pub struct PathExpander<'a> {
    stations: &'a StationIndex,
    expand_paths: bool,
    path_column: bool,
}

impl<'a> PathExpander<'a> {
    pub fn new(stations: &'a StationIndex) -> Self {
        Self {
            stations,
            expand_paths: true,
            path_column: true,
        }
    }

    /// With expansion off every record is taken as one stop already.
    pub fn with_expansion(mut self, expand_paths: bool) -> Self {
        self.expand_paths = expand_paths;
        self
    }

    /// Whether the snapshot has a `path` column at all. Without one, a
    /// missing path says nothing about cancellation.
    pub fn with_path_column(mut self, path_column: bool) -> Self {
        self.path_column = path_column;
        self
    }

    pub fn expand(
        &self,
        records: Vec<RawStopRecord>,
        log: &StageLog<'_>,
    ) -> (Vec<StopEvent>, ExpansionStats) {
        let mut stats = ExpansionStats {
            records_in: records.len(),
            ..ExpansionStats::default()
        };

        let mut journeys: BTreeMap<JourneyId, Vec<RawStopRecord>> = BTreeMap::new();
        for record in records {
            match (record.key.journey_id(), record.key.stop_number) {
                (Some(id), Some(_)) => journeys.entry(id).or_default().push(record),
                _ => stats.invalid_keys += 1,
            }
        }
        if stats.invalid_keys > 0 {
            log.warn(format!(
                "{} records with an unparseable journey key excluded",
                stats.invalid_keys
            ));
        }
        stats.journeys = journeys.len();

        let mut events = Vec::new();
        for (id, group) in journeys {
            let before = events.len();
            if self.expand_paths {
                self.expand_journey(id, group, &mut events, &mut stats);
            } else {
                self.direct_journey(id, group, false, &mut events, &mut stats);
            }
            stats.canceled_stops += events[before..].iter().filter(|e| e.canceled).count();
        }
        stats.stops_out = events.len();

        log.info(format!(
            "{} journeys expanded into {} stops ({} intermediate records dropped, {} canceled journeys)",
            stats.journeys, stats.stops_out, stats.intermediate_records, stats.canceled_journeys
        ));
        if stats.unresolved_stations > 0 {
            log.warn(format!(
                "{} path stations not found in the station index",
                stats.unresolved_stations
            ));
        }

        (events, stats)
    }

    fn expand_journey(
        &self,
        id: JourneyId,
        group: Vec<RawStopRecord>,
        events: &mut Vec<StopEvent>,
        stats: &mut ExpansionStats,
    ) {
        let Some(terminal) = terminal_record(&group) else {
            return;
        };
        let Some(path) = terminal.path.clone() else {
            stats.canceled_journeys += 1;
            self.direct_journey(id, group, true, events, stats);
            return;
        };

        let mut by_stop: HashMap<u32, &RawStopRecord> = HashMap::new();
        for record in &group {
            if let Some(stop) = record.key.stop_number {
                by_stop.entry(stop).or_insert(record);
            }
        }

        let line = terminal.line.clone();
        let origin_station_id = by_stop
            .get(&1)
            .and_then(|r| r.station_id.clone())
            .or_else(|| terminal.station_id.clone());

        let mut matched = 0;
        for (position, segment) in path.split('|').enumerate() {
            let stop_index = position as u32 + 1;
            let name = Some(segment.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string);

            let station_id = name
                .as_deref()
                .and_then(|n| self.stations.resolve(n))
                .map(str::to_string);
            if name.is_some() && station_id.is_none() {
                stats.unresolved_stations += 1;
            }

            let mut event = StopEvent::new(id.clone(), stop_index);
            if let Some(record) = by_stop.get(&stop_index) {
                matched += 1;
                copy_attributes(record, &mut event);
                event.canceled = self.is_canceled(record, stop_index);
            }
            event.station_name = name;
            event.station_id = station_id;
            event.origin_station_id = origin_station_id.clone();
            event.line = line.clone();
            events.push(event);
        }

        stats.intermediate_records += group.len() - matched;
    }

    /// Emits a journey's own records as stops in stop-number order.
    ///
    /// With `renumber` the stop index is the rank of the stop number,
    /// otherwise the stop number itself.
    fn direct_journey(
        &self,
        id: JourneyId,
        mut group: Vec<RawStopRecord>,
        renumber: bool,
        events: &mut Vec<StopEvent>,
        stats: &mut ExpansionStats,
    ) {
        group.sort_by_key(|r| r.key.stop_number);
        let line = terminal_record(&group).and_then(|t| t.line.clone());
        let origin_station_id = group.first().and_then(|r| r.station_id.clone());
        let len = group.len();
        group.dedup_by_key(|r| r.key.stop_number);
        stats.intermediate_records += len - group.len();

        for (rank, record) in group.iter().enumerate() {
            let stop_index = match record.key.stop_number {
                Some(stop) if !renumber => stop,
                _ => rank as u32 + 1,
            };
            let mut event = StopEvent::new(id.clone(), stop_index);
            copy_attributes(record, &mut event);
            event.station_name = record.station_name.clone();
            event.station_id = record.station_id.clone();
            event.origin_station_id = origin_station_id.clone();
            event.line = record.line.clone().or_else(|| line.clone());
            event.canceled = self.is_canceled(record, stop_index);
            events.push(event);
        }
    }

    /// An explicit `canceled` cell wins. Otherwise a record past the first
    /// stop without a path belongs to a canceled ride, when paths exist.
    fn is_canceled(&self, record: &RawStopRecord, stop_index: u32) -> bool {
        record
            .canceled
            .unwrap_or(self.path_column && stop_index > 1 && record.path.is_none())
    }
}

/// Highest reported stop number; ties go to the smallest station id (missing
/// ids last), then input order.
fn terminal_record(group: &[RawStopRecord]) -> Option<&RawStopRecord> {
    group.iter().min_by_key(|r| {
        (
            Reverse(r.key.stop_number),
            r.station_id.is_none(),
            r.station_id.clone(),
        )
    })
}

fn copy_attributes(record: &RawStopRecord, event: &mut StopEvent) {
    event.city = record.city.clone();
    event.zip = record.zip.clone();
    event.latitude = record.latitude;
    event.longitude = record.longitude;
    event.arrival_planned = record.arrival_planned;
    event.departure_planned = record.departure_planned;
    event.arrival_delay = record.arrival_delay;
    event.departure_delay = record.departure_delay;
    event.info = record.info.clone();
}

/// Number of records per station id, most frequent first.
pub fn station_counts(records: &[RawStopRecord]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for id in records.iter().filter_map(|r| r.station_id.as_deref()) {
        *counts.entry(id).or_insert(0) += 1;
    }
    let mut counts: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(id, count)| (id.to_string(), count))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}
