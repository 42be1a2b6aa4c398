//! Domain models for train journeys and the stop events that compose them.
//!
//! A journey is one scheduled run of a train. It is identified by the pair
//! (base id, scheduled departure): the base id alone repeats across reruns,
//! so every grouped computation in this crate keys on [`JourneyId`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical grouping key of a journey instance.
///
/// Ordering is lexicographic on `(base_id, scheduled_departure)`, which gives
/// the feature table a deterministic journey order independent of input order.
///
/// # Examples
///
/// ```
/// use rail_features::core::domain::JourneyId;
/// use chrono::NaiveDate;
///
/// let departure = NaiveDate::from_ymd_opt(2024, 3, 1)
///     .unwrap()
///     .and_hms_opt(10, 30, 0)
///     .unwrap();
/// let first = JourneyId::new("1234", departure);
/// let rerun = JourneyId::new("1234", departure + chrono::Duration::days(1));
/// assert_ne!(first, rerun);
/// assert!(first < rerun);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JourneyId {
    pub base_id: String,
    pub scheduled_departure: NaiveDateTime,
}

impl JourneyId {
    pub fn new(base_id: impl Into<String>, scheduled_departure: NaiveDateTime) -> Self {
        Self {
            base_id: base_id.into(),
            scheduled_departure,
        }
    }
}

impl fmt::Display for JourneyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}",
            self.base_id,
            self.scheduled_departure.format("%Y-%m-%d %H:%M")
        )
    }
}

/// A point on the earth's surface, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Builds coordinates only when both components are present and finite.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(Self::new(lat, lon))
            }
            _ => None,
        }
    }
}

/// One observation of a train at one stop of a reconstructed journey.
///
/// Produced by the path expander (or directly from pre-expanded input) and
/// progressively enriched by later stages. `stop_index` is the canonical
/// visiting order; arrival times are never used to order stops because delays
/// can reorder wall-clock times.
///
/// # Fields
///
/// * `journey` - Grouping key of the journey this stop belongs to
/// * `stop_index` - 1-based position within the journey
/// * `station_name` - Station name as written in the path
/// * `station_id` - Resolved station identifier (IBNR), if known
/// * `origin_station_id` - Station identifier of the journey's first stop
/// * `arrival_delay` / `departure_delay` - Signed minutes; `None` means no recorded delay
/// * `canceled` - Whether the stop's source record carried no path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopEvent {
    pub journey: JourneyId,
    pub stop_index: u32,
    pub station_name: Option<String>,
    pub station_id: Option<String>,
    pub origin_station_id: Option<String>,
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
    pub canceled: bool,
}

impl StopEvent {
    /// Creates a bare stop with every optional attribute unset.
    pub fn new(journey: JourneyId, stop_index: u32) -> Self {
        Self {
            journey,
            stop_index,
            station_name: None,
            station_id: None,
            origin_station_id: None,
            city: None,
            zip: None,
            line: None,
            latitude: None,
            longitude: None,
            arrival_planned: None,
            departure_planned: None,
            arrival_delay: None,
            departure_delay: None,
            info: None,
            canceled: false,
        }
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_parts(self.latitude, self.longitude)
    }

    pub fn set_coordinates(&mut self, coordinates: Coordinates) {
        self.latitude = Some(coordinates.latitude);
        self.longitude = Some(coordinates.longitude);
    }

    pub fn has_coordinates(&self) -> bool {
        self.coordinates().is_some()
    }
}
