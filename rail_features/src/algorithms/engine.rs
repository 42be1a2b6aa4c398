//! Journey windowed feature engine.
//!
//! Takes a flat list of stop events, reconstructs journeys and computes every
//! per-journey feature over each journey in isolation. The city aggregate is
//! the single cross-journey feature and is computed last, over the rows that
//! survive exclusion.

use serde::{Deserialize, Serialize};

use crate::algorithms::city::{avg_city_delay, city_mean_delays};
use crate::algorithms::delay::{delay_features, DelayFeatures};
use crate::algorithms::distance::{distance_features, DistanceFeatures};
use crate::algorithms::progress::{time_features, TimeFeatures};
use crate::algorithms::windows::{group_journeys, Journey};
use crate::core::domain::StopEvent;

/// All engineered features of one stop.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StopFeatures {
    pub delay: DelayFeatures,
    pub time: TimeFeatures,
    pub distance: DistanceFeatures,
    pub avg_city_delay: Option<f64>,
}

/// A stop event together with its features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub event: StopEvent,
    pub features: StopFeatures,
}

/// Counts of rows the engine saw, kept, or excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    pub rows_in: usize,
    pub rows_out: usize,
    pub journeys: usize,
    pub duplicate_stops: usize,
    pub missing_coordinates: usize,
    /// Journeys left with no stop after excluding rows without coordinates.
    pub dropped_journeys: usize,
    pub single_stop_journeys: usize,
    pub non_contiguous_journeys: usize,
}

#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    pub rows: Vec<FeatureRow>,
    pub stats: EngineStats,
}

/// Computes windowed features for every journey in a set of stop events.
///
/// Delay and time features see the whole journey. Stops without coordinates
/// are then excluded and distance features are computed over the remaining
/// stops, so a leg always connects two located stops.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureEngine;

impl FeatureEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn compute(&self, events: Vec<StopEvent>) -> EngineOutput {
        let mut stats = EngineStats {
            rows_in: events.len(),
            ..EngineStats::default()
        };

        let windows = group_journeys(events);
        stats.duplicate_stops = windows.duplicate_stops;
        stats.journeys = windows.journeys.len();

        let mut rows = Vec::with_capacity(stats.rows_in);
        for journey in windows.journeys {
            if !journey.is_contiguous() {
                stats.non_contiguous_journeys += 1;
            }
            let before = rows.len();
            stats.missing_coordinates += Self::compute_journey(journey, &mut rows);
            match rows.len() - before {
                0 => stats.dropped_journeys += 1,
                1 => stats.single_stop_journeys += 1,
                _ => {}
            }
        }

        let means = city_mean_delays(rows.iter().map(|r| &r.event));
        for row in &mut rows {
            row.features.avg_city_delay = avg_city_delay(&means, &row.event);
        }

        stats.rows_out = rows.len();
        EngineOutput { rows, stats }
    }

    /// Appends the located rows of one journey; returns how many were excluded.
    fn compute_journey(journey: Journey, rows: &mut Vec<FeatureRow>) -> usize {
        let total = journey.len();
        let delays = delay_features(&journey.stops);
        let times = time_features(&journey.stops);

        let located: Vec<(StopEvent, DelayFeatures, TimeFeatures)> = journey
            .stops
            .into_iter()
            .zip(delays)
            .zip(times)
            .filter(|((stop, _), _)| stop.has_coordinates())
            .map(|((stop, delay), time)| (stop, delay, time))
            .collect();
        let excluded = total - located.len();

        let points: Vec<_> = located
            .iter()
            .filter_map(|(stop, _, _)| stop.coordinates())
            .collect();
        let distances = distance_features(&points);

        rows.extend(
            located
                .into_iter()
                .zip(distances)
                .map(|((event, delay, time), distance)| FeatureRow {
                    event,
                    features: StopFeatures {
                        delay,
                        time,
                        distance,
                        avg_city_delay: None,
                    },
                }),
        );
        excluded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::JourneyId;
    use approx::assert_relative_eq;
    use chrono::{NaiveDate, NaiveDateTime};

    fn departure(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn stop(base: &str, hour: u32, index: u32, delay: f64, lat: Option<f64>) -> StopEvent {
        let mut s = StopEvent::new(JourneyId::new(base, departure(hour)), index);
        s.arrival_delay = Some(delay);
        s.latitude = lat;
        s.longitude = lat.map(|_| 8.0);
        s.city = Some(format!("city-{index}"));
        s
    }

    #[test]
    fn test_three_stop_scenario() {
        let output = FeatureEngine::new().compute(vec![
            stop("1", 8, 3, 1.0, Some(50.2)),
            stop("1", 8, 1, 2.0, Some(50.0)),
            stop("1", 8, 2, 5.0, Some(50.1)),
        ]);
        let cumulative: Vec<_> = output
            .rows
            .iter()
            .map(|r| r.features.delay.cumulative_delay)
            .collect();
        let gain: Vec<_> = output.rows.iter().map(|r| r.features.delay.delay_gain).collect();
        assert_eq!(cumulative, vec![Some(2.0), Some(7.0), Some(8.0)]);
        assert_eq!(gain, vec![0.0, 5.0, 1.0]);
        assert_eq!(output.rows[2].features.distance.distance_progress, 1.0);
        assert_eq!(output.stats.journeys, 1);
        assert_eq!(output.stats.rows_out, 3);
    }

    #[test]
    fn test_no_information_crosses_journeys() {
        let output = FeatureEngine::new().compute(vec![
            stop("1", 8, 1, 10.0, Some(50.0)),
            stop("1", 9, 1, 3.0, Some(51.0)),
            stop("1", 9, 2, 4.0, Some(51.1)),
        ]);
        assert_eq!(output.stats.journeys, 2);
        let rerun_first = &output.rows[1];
        assert_eq!(rerun_first.event.journey.scheduled_departure, departure(9));
        assert_eq!(rerun_first.features.delay.prev_arrival_delay, 0.0);
        assert_eq!(rerun_first.features.delay.cumulative_delay, Some(3.0));
        assert_eq!(rerun_first.features.distance.distance_from_origin, 0.0);
    }

    #[test]
    fn test_missing_coordinates_are_excluded() {
        let output = FeatureEngine::new().compute(vec![
            stop("1", 8, 1, 2.0, Some(50.0)),
            stop("1", 8, 2, 5.0, None),
            stop("1", 8, 3, 1.0, Some(50.2)),
        ]);
        assert_eq!(output.stats.missing_coordinates, 1);
        assert_eq!(output.rows.len(), 2);
        let last = &output.rows[1];
        // Delay features still see the excluded stop
        assert_eq!(last.features.delay.prev_arrival_delay, 5.0);
        assert_eq!(last.features.time.max_stop_index, 3);
        // Distance skips straight from stop 1 to stop 3
        assert_relative_eq!(
            last.features.distance.distance_to_prev_stop,
            crate::algorithms::geodesy::haversine_km(
                crate::core::domain::Coordinates::new(50.0, 8.0),
                crate::core::domain::Coordinates::new(50.2, 8.0),
            )
        );
    }

    #[test]
    fn test_single_stop_journey_defaults() {
        let output = FeatureEngine::new().compute(vec![stop("5", 8, 1, 3.0, Some(50.0))]);
        let features = &output.rows[0].features;
        assert_eq!(features.distance, DistanceFeatures::default());
        assert_eq!(features.delay.prev_arrival_delay, 0.0);
        assert_eq!(features.delay.weighted_avg_prev_delay, 0.0);
        assert_eq!(output.stats.single_stop_journeys, 1);
    }

    #[test]
    fn test_journey_without_coordinates_is_dropped() {
        let output = FeatureEngine::new().compute(vec![
            stop("5", 8, 1, 3.0, None),
            stop("5", 8, 2, 3.0, None),
        ]);
        assert!(output.rows.is_empty());
        assert_eq!(output.stats.dropped_journeys, 1);
        assert_eq!(output.stats.missing_coordinates, 2);
    }

    #[test]
    fn test_city_average_over_surviving_rows() {
        let mut a = stop("1", 8, 1, 2.0, Some(50.0));
        let mut b = stop("2", 8, 1, 6.0, Some(50.0));
        let mut c = stop("3", 8, 1, 100.0, None);
        for s in [&mut a, &mut b, &mut c] {
            s.city = Some("Mainz".to_string());
        }
        let output = FeatureEngine::new().compute(vec![a, b, c]);
        assert!(output
            .rows
            .iter()
            .all(|r| r.features.avg_city_delay == Some(4.0)));
    }

    #[test]
    fn test_duplicates_and_gaps_are_counted() {
        let output = FeatureEngine::new().compute(vec![
            stop("1", 8, 1, 2.0, Some(50.0)),
            stop("1", 8, 1, 9.0, Some(50.0)),
            stop("1", 8, 3, 1.0, Some(50.2)),
        ]);
        assert_eq!(output.stats.duplicate_stops, 1);
        assert_eq!(output.stats.non_contiguous_journeys, 1);
        assert_eq!(output.stats.rows_in, 3);
        assert_eq!(output.stats.rows_out, 2);
    }
}
