//! Cross-journey mean arrival delay per city.

use std::collections::HashMap;

use crate::core::domain::StopEvent;

/// Mean of the non-missing arrival delays per city over all given stops.
///
/// Cities whose stops all lack a delay are absent from the map.
pub fn city_mean_delays<'a, I>(stops: I) -> HashMap<String, f64>
where
    I: IntoIterator<Item = &'a StopEvent>,
{
    let mut sums: HashMap<String, (f64, usize)> = HashMap::new();
    for stop in stops {
        if let (Some(city), Some(delay)) = (stop.city.as_ref(), stop.arrival_delay) {
            let entry = sums.entry(city.clone()).or_insert((0.0, 0));
            entry.0 += delay;
            entry.1 += 1;
        }
    }

    sums.into_iter()
        .map(|(city, (sum, count))| (city, sum / count as f64))
        .collect()
}

/// Looks up the city average for one stop; `None` for stops without a city.
pub fn avg_city_delay(means: &HashMap<String, f64>, stop: &StopEvent) -> Option<f64> {
    stop.city.as_ref().and_then(|city| means.get(city).copied())
}
