//! Journey windowed feature computation.
//!
//! This module holds the numeric core of the crate: grouping stop events into
//! journeys and computing lag, cumulative delay, time-progress and
//! distance-progress features over each journey's ordered stops.
//!
//! # Components
//!
//! - [`windows`]: Grouping by journey and ordering by stop index
//! - [`delay`]: Lag, weighted trailing average and cumulative delay features
//! - [`progress`]: Station and planned-time progress ratios
//! - [`geodesy`]: Haversine distance
//! - [`distance`]: Distance-progress features
//! - [`city`]: Cross-journey mean delay per city
//! - [`engine`]: [`FeatureEngine`] tying the above together
//!
//! # Example
//!
//! ```
//! use rail_features::algorithms::FeatureEngine;
//! use rail_features::core::{JourneyId, StopEvent};
//! use chrono::NaiveDate;
//!
//! let departure = NaiveDate::from_ymd_opt(2024, 3, 1)
//!     .unwrap()
//!     .and_hms_opt(10, 30, 0)
//!     .unwrap();
//! let id = JourneyId::new("1234", departure);
//! let events: Vec<StopEvent> = (1..=3)
//!     .map(|i| {
//!         let mut stop = StopEvent::new(id.clone(), i);
//!         stop.latitude = Some(50.0 + i as f64 * 0.1);
//!         stop.longitude = Some(8.0);
//!         stop.arrival_delay = Some(i as f64);
//!         stop
//!     })
//!     .collect();
//!
//! let output = FeatureEngine::new().compute(events);
//! assert_eq!(output.rows.len(), 3);
//! assert_eq!(output.rows[2].features.delay.cumulative_delay, Some(6.0));
//! ```

pub mod city;
pub mod delay;
pub mod distance;
pub mod engine;
pub mod geodesy;
pub mod progress;
pub mod windows;

pub use delay::DelayFeatures;
pub use distance::DistanceFeatures;
pub use engine::{EngineOutput, EngineStats, FeatureEngine, FeatureRow, StopFeatures};
pub use geodesy::haversine_km;
pub use progress::{safe_ratio, TimeFeatures};
pub use windows::{group_journeys, Journey, JourneyWindows};
