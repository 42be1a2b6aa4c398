//! Station and planned-time progress within one journey.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::core::domain::StopEvent;
use crate::parsing::values::minutes_between;

/// Divides two values, mapping infinite or NaN results to 0.
///
/// Used for every progress ratio: a degenerate denominator yields a
/// defined 0 rather than a missing value.
///
/// # Examples
///
/// ```
/// use rail_features::algorithms::progress::safe_ratio;
///
/// assert_eq!(safe_ratio(3.0, 4.0), 0.75);
/// assert_eq!(safe_ratio(3.0, 0.0), 0.0);
/// assert_eq!(safe_ratio(0.0, 0.0), 0.0);
/// ```
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    let ratio = numerator / denominator;
    if ratio.is_finite() {
        ratio
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeFeatures {
    pub max_stop_index: u32,
    /// `stop_index / max_stop_index`.
    pub station_progress: f64,
    pub origin_departure: Option<NaiveDateTime>,
    /// Minutes from origin departure to the planned arrival here.
    pub planned_elapsed_time: Option<f64>,
    /// Minutes from origin departure to the planned arrival at the last stop.
    pub total_planned_time: Option<f64>,
    pub time_progress: Option<f64>,
    /// `station_progress / time_progress`, 0 when undefined.
    pub progress_ratio: f64,
    pub next_arrival_plan: Option<NaiveDateTime>,
    /// Minutes from the planned departure here to the planned arrival at the next stop.
    pub planned_travel_time_to_next_stop: Option<f64>,
}

/// Computes time features for one journey's stops, given in stop order.
pub fn time_features(stops: &[StopEvent]) -> Vec<TimeFeatures> {
    let max_stop_index = stops.iter().map(|s| s.stop_index).max().unwrap_or(0);
    let origin_departure = stops.iter().find_map(|s| s.departure_planned);
    let final_arrival = stops.iter().rev().find_map(|s| s.arrival_planned);
    let total_planned_time = origin_departure
        .zip(final_arrival)
        .map(|(start, end)| minutes_between(start, end));

    stops
        .iter()
        .enumerate()
        .map(|(position, stop)| {
            let station_progress = safe_ratio(stop.stop_index as f64, max_stop_index as f64);

            let planned_elapsed_time = origin_departure
                .zip(stop.arrival_planned)
                .map(|(start, arrival)| minutes_between(start, arrival));

            let time_progress = planned_elapsed_time
                .zip(total_planned_time)
                .map(|(elapsed, total)| elapsed / total)
                .filter(|ratio| ratio.is_finite());

            let progress_ratio = time_progress
                .map(|t| safe_ratio(station_progress, t))
                .unwrap_or(0.0);

            let next_arrival_plan = stops.get(position + 1).and_then(|n| n.arrival_planned);
            let planned_travel_time_to_next_stop = stop
                .departure_planned
                .zip(next_arrival_plan)
                .map(|(departure, arrival)| minutes_between(departure, arrival));

            TimeFeatures {
                max_stop_index,
                station_progress,
                origin_departure,
                planned_elapsed_time,
                total_planned_time,
                time_progress,
                progress_ratio,
                next_arrival_plan,
                planned_travel_time_to_next_stop,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::JourneyId;
    use crate::parsing::values::parse_timestamp;
    use approx::assert_relative_eq;

    fn at(raw: &str) -> Option<NaiveDateTime> {
        parse_timestamp(raw)
    }

    fn stop(index: u32, arrival: Option<&str>, departure: Option<&str>) -> StopEvent {
        let id = JourneyId::new("9", at("2024-03-01 10:00:00").unwrap());
        let mut s = StopEvent::new(id, index);
        s.arrival_planned = arrival.and_then(at);
        s.departure_planned = departure.and_then(at);
        s
    }

    fn three_stops() -> Vec<StopEvent> {
        vec![
            stop(1, None, Some("2024-03-01 10:00:00")),
            stop(2, Some("2024-03-01 10:20:00"), Some("2024-03-01 10:22:00")),
            stop(3, Some("2024-03-01 10:40:00"), None),
        ]
    }

    #[test]
    fn test_station_progress() {
        let features = time_features(&three_stops());
        assert_eq!(features[0].max_stop_index, 3);
        assert_relative_eq!(features[0].station_progress, 1.0 / 3.0);
        assert_relative_eq!(features[2].station_progress, 1.0);
    }

    #[test]
    fn test_elapsed_and_total_time() {
        let features = time_features(&three_stops());
        assert_eq!(features[0].origin_departure, at("2024-03-01 10:00:00"));
        assert_eq!(features[0].planned_elapsed_time, None);
        assert_eq!(features[1].planned_elapsed_time, Some(20.0));
        assert_eq!(features[1].total_planned_time, Some(40.0));
        assert_eq!(features[1].time_progress, Some(0.5));
        // (2/3) / 0.5
        assert_relative_eq!(features[1].progress_ratio, 4.0 / 3.0);
        assert_eq!(features[2].time_progress, Some(1.0));
    }

    #[test]
    fn test_undefined_time_progress_gives_zero_ratio() {
        let features = time_features(&three_stops());
        assert_eq!(features[0].time_progress, None);
        assert_eq!(features[0].progress_ratio, 0.0);
    }

    #[test]
    fn test_zero_total_time() {
        let stops = vec![
            stop(1, None, Some("2024-03-01 10:00:00")),
            stop(2, Some("2024-03-01 10:00:00"), None),
        ];
        let features = time_features(&stops);
        assert_eq!(features[1].total_planned_time, Some(0.0));
        assert_eq!(features[1].time_progress, None);
        assert_eq!(features[1].progress_ratio, 0.0);
    }

    #[test]
    fn test_travel_time_to_next_stop() {
        let features = time_features(&three_stops());
        assert_eq!(features[0].planned_travel_time_to_next_stop, Some(20.0));
        assert_eq!(features[1].planned_travel_time_to_next_stop, Some(18.0));
        assert_eq!(features[1].next_arrival_plan, at("2024-03-01 10:40:00"));
        assert_eq!(features[2].planned_travel_time_to_next_stop, None);
        assert_eq!(features[2].next_arrival_plan, None);
    }

    #[test]
    fn test_single_stop() {
        let features = time_features(&[stop(1, None, Some("2024-03-01 10:00:00"))]);
        assert_eq!(features[0].station_progress, 1.0);
        assert_eq!(features[0].total_planned_time, None);
        assert_eq!(features[0].progress_ratio, 0.0);
    }

    #[test]
    fn test_safe_ratio() {
        assert_eq!(safe_ratio(1.0, 0.0), 0.0);
        assert_eq!(safe_ratio(-1.0, 0.0), 0.0);
        assert_eq!(safe_ratio(f64::NAN, 1.0), 0.0);
        assert_eq!(safe_ratio(1.0, 4.0), 0.25);
    }
}
