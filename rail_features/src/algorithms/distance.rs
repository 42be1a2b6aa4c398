//! Geodesic distance-progress features within one journey.

use serde::{Deserialize, Serialize};

use crate::algorithms::geodesy::leg_distances;
use crate::algorithms::progress::safe_ratio;
use crate::core::domain::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DistanceFeatures {
    pub distance_to_prev_stop: f64,
    pub distance_to_next_stop: f64,
    pub distance_from_origin: f64,
    pub total_distance: f64,
    pub distance_progress: f64,
}

/// Computes distance features for one journey's stop coordinates, in stop order.
///
/// All values are kilometres except `distance_progress`. The first leg to the
/// previous stop and the last leg to the next stop are 0.
pub fn distance_features(points: &[Coordinates]) -> Vec<DistanceFeatures> {
    let legs = leg_distances(points);

    let mut from_origin = Vec::with_capacity(points.len());
    let mut running = 0.0;
    for position in 0..points.len() {
        if position > 0 {
            running += legs[position - 1];
        }
        from_origin.push(running);
    }
    let total_distance = from_origin.last().copied().unwrap_or(0.0);

    (0..points.len())
        .map(|position| DistanceFeatures {
            distance_to_prev_stop: position
                .checked_sub(1)
                .map(|p| legs[p])
                .unwrap_or(0.0),
            distance_to_next_stop: legs.get(position).copied().unwrap_or(0.0),
            distance_from_origin: from_origin[position],
            total_distance,
            distance_progress: safe_ratio(from_origin[position], total_distance),
        })
        .collect()
}
