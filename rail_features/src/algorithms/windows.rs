//! Journey windows: grouping stop events by journey and ordering them.
//!
//! Every windowed feature is computed over one [`Journey`] at a time. The
//! grouping key is the full [`JourneyId`] (base id and scheduled departure);
//! grouping on the base id alone would merge reruns of the same train.

use std::collections::BTreeMap;

use crate::core::domain::{JourneyId, StopEvent};

/// One journey's stops, sorted by `stop_index` ascending, at most one stop per index.
#[derive(Debug, Clone, PartialEq)]
pub struct Journey {
    pub id: JourneyId,
    pub stops: Vec<StopEvent>,
}

impl Journey {
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn max_stop_index(&self) -> u32 {
        self.stops.iter().map(|s| s.stop_index).max().unwrap_or(0)
    }

    /// Whether stop indices run 1..=N without gaps.
    pub fn is_contiguous(&self) -> bool {
        self.stops
            .iter()
            .enumerate()
            .all(|(position, stop)| stop.stop_index as usize == position + 1)
    }
}

/// Result of splitting a flat event list into journeys.
#[derive(Debug, Clone, Default)]
pub struct JourneyWindows {
    pub journeys: Vec<Journey>,
    /// Events dropped because another event already held the same (journey, stop_index).
    pub duplicate_stops: usize,
}

/// Groups events by journey and sorts each group by stop index.
///
/// Incoming row order is irrelevant: journeys come out ordered by
/// [`JourneyId`], stops by `stop_index`. When several events share a
/// (journey, stop_index) the first one in input order is kept.
pub fn group_journeys(events: Vec<StopEvent>) -> JourneyWindows {
    let mut grouped: BTreeMap<JourneyId, Vec<StopEvent>> = BTreeMap::new();
    for event in events {
        grouped.entry(event.journey.clone()).or_default().push(event);
    }

    let mut duplicate_stops = 0;
    let journeys = grouped
        .into_iter()
        .map(|(id, mut stops)| {
            // Stable, so the first event of a duplicated index stays in front
            stops.sort_by_key(|s| s.stop_index);
            let before = stops.len();
            stops.dedup_by_key(|s| s.stop_index);
            duplicate_stops += before - stops.len();
            Journey { id, stops }
        })
        .collect();

    JourneyWindows {
        journeys,
        duplicate_stops,
    }
}
