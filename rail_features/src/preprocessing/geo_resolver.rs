//! Filling in missing stop coordinates.
//!
//! Coordinates are resolved through an ordered chain. Each step only touches
//! stops that are still missing a latitude or longitude:
//!
//! 1. A first stop without a station id inherits the journey's origin id.
//! 2. The European station table, keyed by station id.
//! 3. The manually curated table, keyed by normalized station name.
//! 4. A [`Geocoder`], usually backed by an external service.

use polars::prelude::DataFrame;
use serde::Serialize;
use std::collections::HashMap;

use crate::core::domain::{Coordinates, StopEvent};
use crate::error::{PipelineError, PipelineResult};
use crate::logging::StageLog;
use crate::parsing::csv_parser::text_column;
use crate::parsing::schema::{european_stations, manual_coordinates};
use crate::parsing::values::{normalize_identifier, normalize_station_name, parse_number};

/// Name-based coordinate lookup of last resort.
pub trait Geocoder {
    fn locate(&self, station_name: &str) -> Option<Coordinates>;
}

/// Geocoder that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeocoder;

impl Geocoder for NoGeocoder {
    fn locate(&self, _station_name: &str) -> Option<Coordinates> {
        None
    }
}

/// In-memory geocoder keyed by normalized station name.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    places: HashMap<String, Coordinates>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, name: &str, coordinates: Coordinates) -> Self {
        if let Some(key) = normalize_station_name(name) {
            self.places.insert(key, coordinates);
        }
        self
    }
}

impl Geocoder for StaticGeocoder {
    fn locate(&self, station_name: &str) -> Option<Coordinates> {
        let key = normalize_station_name(station_name)?;
        self.places.get(&key).copied()
    }
}

/// Coordinate lookup table built from a reference CSV.
#[derive(Debug, Clone, Default)]
pub struct CoordinateTable {
    entries: HashMap<String, Coordinates>,
}

impl CoordinateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// European station table keyed by UIC id, restricted to one country code.
    pub fn from_european_stations(df: &DataFrame, country: &str) -> PipelineResult<Self> {
        let [ids, lats, longs, countries] = required_columns(
            df,
            [
                european_stations::UIC,
                european_stations::LATITUDE,
                european_stations::LONGITUDE,
                european_stations::COUNTRY,
            ],
        )?;

        let mut table = Self::new();
        for i in 0..ids.len() {
            if countries[i].as_deref().map(str::trim) != Some(country) {
                continue;
            }
            let key = ids[i].as_deref().and_then(normalize_identifier);
            let point = Coordinates::from_parts(
                lats[i].as_deref().and_then(parse_number),
                longs[i].as_deref().and_then(parse_number),
            );
            if let (Some(key), Some(point)) = (key, point) {
                table.entries.entry(key).or_insert(point);
            }
        }
        Ok(table)
    }

    /// Manually curated table keyed by cleaned station name.
    pub fn from_manual_coordinates(df: &DataFrame) -> PipelineResult<Self> {
        let [names, lats, longs] = required_columns(
            df,
            [
                manual_coordinates::STATION_NAME,
                manual_coordinates::LAT,
                manual_coordinates::LONG,
            ],
        )?;

        let mut table = Self::new();
        for i in 0..names.len() {
            let key = names[i].as_deref().and_then(normalize_station_name);
            let point = Coordinates::from_parts(
                lats[i].as_deref().and_then(parse_number),
                longs[i].as_deref().and_then(parse_number),
            );
            if let (Some(key), Some(point)) = (key, point) {
                table.entries.entry(key).or_insert(point);
            }
        }
        Ok(table)
    }

    pub fn insert(&mut self, key: impl Into<String>, coordinates: Coordinates) {
        self.entries.insert(key.into(), coordinates);
    }

    pub fn get(&self, key: &str) -> Option<Coordinates> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn required_columns<const N: usize>(
    df: &DataFrame,
    names: [&str; N],
) -> PipelineResult<[Vec<Option<String>>; N]> {
    let mut missing = Vec::new();
    let mut columns = Vec::with_capacity(N);
    for name in names {
        match text_column(df, name)? {
            Some(values) => columns.push(values),
            None => missing.push(name.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(PipelineError::MissingColumns(missing));
    }
    columns
        .try_into()
        .map_err(|_| PipelineError::InvalidInput("column count mismatch".to_string()))
}

/// How many stops each step of the chain located.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeoStats {
    pub stops: usize,
    pub already_located: usize,
    pub origin_ids_inherited: usize,
    pub from_reference_table: usize,
    pub from_manual_table: usize,
    pub from_geocoder: usize,
    pub still_missing: usize,
}

/// Ordered coordinate fallback chain.
pub struct GeoResolver {
    reference: CoordinateTable,
    manual: CoordinateTable,
    geocoder: Box<dyn Geocoder>,
}

impl GeoResolver {
    pub fn new(reference: CoordinateTable, manual: CoordinateTable) -> Self {
        Self {
            reference,
            manual,
            geocoder: Box::new(NoGeocoder),
        }
    }

    pub fn with_geocoder(mut self, geocoder: Box<dyn Geocoder>) -> Self {
        self.geocoder = geocoder;
        self
    }

    pub fn resolve(&self, events: &mut [StopEvent], log: &StageLog<'_>) -> GeoStats {
        let mut stats = GeoStats {
            stops: events.len(),
            ..GeoStats::default()
        };

        for event in events.iter_mut() {
            if event.stop_index == 1 && event.station_id.is_none() {
                if let Some(origin) = event.origin_station_id.clone() {
                    event.station_id = Some(origin);
                    stats.origin_ids_inherited += 1;
                }
            }

            if event.has_coordinates() {
                stats.already_located += 1;
                continue;
            }

            if let Some(point) = event.station_id.as_deref().and_then(|id| {
                normalize_identifier(id).and_then(|key| self.reference.get(&key))
            }) {
                event.set_coordinates(point);
                stats.from_reference_table += 1;
                continue;
            }

            let name_key = event.station_name.as_deref().and_then(normalize_station_name);
            if let Some(point) = name_key.as_deref().and_then(|key| self.manual.get(key)) {
                event.set_coordinates(point);
                stats.from_manual_table += 1;
                continue;
            }

            if let Some(point) = event
                .station_name
                .as_deref()
                .and_then(|name| self.geocoder.locate(name))
            {
                event.set_coordinates(point);
                stats.from_geocoder += 1;
                continue;
            }

            stats.still_missing += 1;
        }

        log.info(format!(
            "{} stops located: {} present, {} reference, {} manual, {} geocoder",
            stats.stops - stats.still_missing,
            stats.already_located,
            stats.from_reference_table,
            stats.from_manual_table,
            stats.from_geocoder
        ));
        if stats.still_missing > 0 {
            log.warn(format!("{} stops still without coordinates", stats.still_missing));
        }

        stats
    }
}

impl Default for GeoResolver {
    fn default() -> Self {
        Self::new(CoordinateTable::new(), CoordinateTable::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::JourneyId;
    use crate::logging::RunLog;
    use chrono::NaiveDate;
    use polars::prelude::*;

    fn stop(index: u32, name: Option<&str>, id: Option<&str>) -> StopEvent {
        let departure = NaiveDate::from_ymd_opt(2024, 7, 16)
            .unwrap()
            .and_hms_opt(6, 44, 0)
            .unwrap();
        let mut s = StopEvent::new(JourneyId::new("1", departure), index);
        s.station_name = name.map(str::to_string);
        s.station_id = id.map(str::to_string);
        s
    }

    fn european() -> DataFrame {
        df!(
            "uic" => ["8000207", "8000044", "8500010"],
            "latitude" => ["50.943", "50.732", "47.547"],
            "longitude" => ["6.958", "7.097", "7.589"],
            "country" => ["DE", "DE", "CH"],
        )
        .unwrap()
    }

    #[test]
    fn test_european_table_filters_country() {
        let table = CoordinateTable::from_european_stations(&european(), "DE").unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.get("8500010").is_none());
        assert_eq!(table.get("8000207"), Some(Coordinates::new(50.943, 6.958)));
    }

    #[test]
    fn test_missing_reference_columns() {
        let df = df!("uic" => ["1"]).unwrap();
        match CoordinateTable::from_european_stations(&df, "DE") {
            Err(PipelineError::MissingColumns(missing)) => assert_eq!(missing.len(), 3),
            other => panic!("unexpected: {:?}", other.map(|t| t.len())),
        }
    }

    #[test]
    fn test_chain_order() {
        let run = RunLog::new("test");
        let reference = CoordinateTable::from_european_stations(&european(), "DE").unwrap();
        let manual = CoordinateTable::from_manual_coordinates(
            &df!(
                "clear_station_name" => ["Bonn Hbf", "Hürth"],
                "lat" => ["1.0", "50.87"],
                "long" => ["1.0", "6.86"],
            )
            .unwrap(),
        )
        .unwrap();
        let geocoder = StaticGeocoder::new().with_place("Brühl", Coordinates::new(50.83, 6.9));
        let resolver = GeoResolver::new(reference, manual).with_geocoder(Box::new(geocoder));

        let mut origin = stop(1, Some("Köln Hbf"), None);
        origin.origin_station_id = Some("8000207.0".to_string());
        let mut located = stop(2, Some("Somewhere"), None);
        located.set_coordinates(Coordinates::new(10.0, 10.0));

        let mut events = vec![
            origin,
            located,
            stop(3, Some("Bonn Hbf"), Some("8000044")),
            stop(4, Some(" hürth "), None),
            stop(5, Some("Brühl"), None),
            stop(6, Some("Nowhere"), None),
        ];
        let stats = resolver.resolve(&mut events, &run.stage("GeoResolver"));

        assert_eq!(events[0].station_id.as_deref(), Some("8000207.0"));
        assert_eq!(events[0].latitude, Some(50.943));
        assert_eq!(events[1].latitude, Some(10.0));
        // Reference table wins over the manual entry for the same station
        assert_eq!(events[2].latitude, Some(50.732));
        assert_eq!(events[3].latitude, Some(50.87));
        assert_eq!(events[4].latitude, Some(50.83));
        assert!(!events[5].has_coordinates());

        assert_eq!(
            stats,
            GeoStats {
                stops: 6,
                already_located: 1,
                origin_ids_inherited: 1,
                from_reference_table: 2,
                from_manual_table: 1,
                from_geocoder: 1,
                still_missing: 1,
            }
        );
    }

    #[test]
    fn test_no_geocoder() {
        assert!(NoGeocoder.locate("Köln Hbf").is_none());
    }
}
