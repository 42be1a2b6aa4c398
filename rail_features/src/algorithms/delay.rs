//! Lag and cumulative delay statistics within one journey.
//!
//! All features here look backwards only. The weighted trailing average at a
//! stop never includes that stop's own delay, so the features can be used to
//! predict the delay at the current stop without leakage.

use serde::{Deserialize, Serialize};

use crate::core::domain::StopEvent;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DelayFeatures {
    /// Arrival delay at the preceding stop, 0 at the first stop.
    pub prev_arrival_delay: f64,
    /// Departure delay at the preceding stop, 0 at the first stop.
    pub prev_departure_delay: f64,
    /// Position-weighted mean arrival delay over all earlier stops.
    pub weighted_avg_prev_delay: f64,
    /// Running sum of arrival delays; `None` where the stop's own delay is missing.
    pub cumulative_delay: Option<f64>,
    /// First difference of `cumulative_delay`, 0 at the first stop.
    pub delay_gain: f64,
}

/// Computes delay features for one journey's stops, given in stop order.
///
/// Missing delays count as 0 for the lag and weighted-average features.
/// The cumulative sum skips missing delays and is itself missing on those
/// rows; a gain next to a missing cumulative value is 0.
pub fn delay_features(stops: &[StopEvent]) -> Vec<DelayFeatures> {
    let mut features = Vec::with_capacity(stops.len());

    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    let mut weighted_avg_so_far = 0.0;
    let mut running_delay = 0.0;
    let mut previous_cumulative: Option<f64> = None;

    for (position, stop) in stops.iter().enumerate() {
        let previous = position.checked_sub(1).map(|p| &stops[p]);

        let cumulative_delay = stop.arrival_delay.map(|delay| {
            running_delay += delay;
            running_delay
        });

        let delay_gain = match (position, cumulative_delay, previous_cumulative) {
            (0, _, _) => 0.0,
            (_, Some(current), Some(before)) => current - before,
            _ => 0.0,
        };

        features.push(DelayFeatures {
            prev_arrival_delay: previous.and_then(|p| p.arrival_delay).unwrap_or(0.0),
            prev_departure_delay: previous.and_then(|p| p.departure_delay).unwrap_or(0.0),
            weighted_avg_prev_delay: weighted_avg_so_far,
            cumulative_delay,
            delay_gain,
        });

        // Only after storing: the current delay may influence later stops only
        let weight = (position + 1) as f64;
        weighted_sum += stop.arrival_delay.unwrap_or(0.0) * weight;
        weight_total += weight;
        weighted_avg_so_far = weighted_sum / weight_total;
        previous_cumulative = cumulative_delay;
    }

    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::JourneyId;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn journey(arrival: &[Option<f64>]) -> Vec<StopEvent> {
        let id = JourneyId::new(
            "42",
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
        );
        arrival
            .iter()
            .enumerate()
            .map(|(i, delay)| {
                let mut stop = StopEvent::new(id.clone(), i as u32 + 1);
                stop.arrival_delay = *delay;
                stop.departure_delay = delay.map(|d| d + 1.0);
                stop
            })
            .collect()
    }

    #[test]
    fn test_cumulative_and_gain() {
        let features = delay_features(&journey(&[Some(2.0), Some(5.0), Some(1.0)]));
        let cumulative: Vec<Option<f64>> = features.iter().map(|f| f.cumulative_delay).collect();
        let gain: Vec<f64> = features.iter().map(|f| f.delay_gain).collect();
        assert_eq!(cumulative, vec![Some(2.0), Some(7.0), Some(8.0)]);
        assert_eq!(gain, vec![0.0, 5.0, 1.0]);
    }

    #[test]
    fn test_lags() {
        let features = delay_features(&journey(&[Some(2.0), Some(5.0), Some(1.0)]));
        assert_eq!(features[0].prev_arrival_delay, 0.0);
        assert_eq!(features[0].prev_departure_delay, 0.0);
        assert_eq!(features[1].prev_arrival_delay, 2.0);
        assert_eq!(features[1].prev_departure_delay, 3.0);
        assert_eq!(features[2].prev_arrival_delay, 5.0);
    }

    #[test]
    fn test_weighted_average_lags_one_stop() {
        let features = delay_features(&journey(&[Some(2.0), Some(5.0), Some(1.0)]));
        assert_eq!(features[0].weighted_avg_prev_delay, 0.0);
        // Over stop 1 only: (2*1)/1
        assert_relative_eq!(features[1].weighted_avg_prev_delay, 2.0);
        // Over stops 1..2: (2*1 + 5*2)/(1+2)
        assert_relative_eq!(features[2].weighted_avg_prev_delay, 4.0);
    }

    #[test]
    fn test_missing_delays() {
        let features = delay_features(&journey(&[Some(2.0), None, Some(3.0)]));
        assert_eq!(features[1].cumulative_delay, None);
        assert_eq!(features[1].delay_gain, 0.0);
        assert_eq!(features[2].prev_arrival_delay, 0.0);
        // Missing cumulative on the previous row: gain falls back to 0
        assert_eq!(features[2].cumulative_delay, Some(5.0));
        assert_eq!(features[2].delay_gain, 0.0);
        assert_relative_eq!(features[2].weighted_avg_prev_delay, 2.0 / 3.0);
    }

    #[test]
    fn test_single_stop_defaults() {
        let features = delay_features(&journey(&[Some(4.0)]));
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].prev_arrival_delay, 0.0);
        assert_eq!(features[0].delay_gain, 0.0);
        assert_eq!(features[0].weighted_avg_prev_delay, 0.0);
        assert_eq!(features[0].cumulative_delay, Some(4.0));
    }

    #[test]
    fn test_empty_journey() {
        assert!(delay_features(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn prop_own_delay_never_leaks(
            delays in prop::collection::vec(-30.0f64..120.0, 1..12),
            pick in 0usize..12,
            replacement in -30.0f64..120.0,
        ) {
            let i = pick % delays.len();
            let baseline = delay_features(&journey(&delays.iter().copied().map(Some).collect::<Vec<_>>()));
            let mut changed = delays.clone();
            changed[i] = replacement;
            let altered = delay_features(&journey(&changed.iter().copied().map(Some).collect::<Vec<_>>()));

            for k in 0..=i {
                prop_assert_eq!(baseline[k].weighted_avg_prev_delay, altered[k].weighted_avg_prev_delay);
            }
        }

        #[test]
        fn prop_last_cumulative_is_total(delays in prop::collection::vec(-30.0f64..120.0, 1..12)) {
            let features = delay_features(&journey(&delays.iter().copied().map(Some).collect::<Vec<_>>()));
            let total: f64 = delays.iter().sum();
            let last = features.last().and_then(|f| f.cumulative_delay).unwrap();
            prop_assert!((last - total).abs() < 1e-9);
            prop_assert_eq!(features[0].delay_gain, 0.0);
            prop_assert_eq!(features[0].prev_arrival_delay, 0.0);
        }
    }
}
