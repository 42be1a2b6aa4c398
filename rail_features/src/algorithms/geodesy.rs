//! Great-circle distances between stops.

use crate::core::domain::Coordinates;

/// Mean earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points, in kilometres.
///
/// `a = sin²(Δφ/2) + cos(φ1)·cos(φ2)·sin²(Δλ/2)`, `d = 2R·atan2(√a, √(1−a))`,
/// with latitudes and longitudes converted from degrees to radians first.
///
/// # Examples
///
/// ```
/// use rail_features::algorithms::geodesy::haversine_km;
/// use rail_features::core::domain::Coordinates;
///
/// let berlin = Coordinates::new(52.52, 13.405);
/// let munich = Coordinates::new(48.1351, 11.5820);
/// let d = haversine_km(berlin, munich);
/// assert!((d - 504.0).abs() < 2.0);
/// assert_eq!(haversine_km(berlin, berlin), 0.0);
/// ```
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let delta_phi = phi2 - phi1;
    let delta_lambda = to.longitude.to_radians() - from.longitude.to_radians();

    // Rounding can push `a` just past 1 for near-antipodal points
    let a = ((delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Distances between each consecutive pair of points (`n - 1` legs for `n` points).
pub fn leg_distances(points: &[Coordinates]) -> Vec<f64> {
    points
        .windows(2)
        .map(|pair| haversine_km(pair[0], pair[1]))
        .collect()
}
