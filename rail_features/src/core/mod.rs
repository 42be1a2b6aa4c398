//! Core domain models for train journeys.
//!
//! This module defines the fundamental data structures shared by every
//! pipeline stage: the journey grouping key, coordinates, and stop events.

pub mod domain;

pub use domain::{Coordinates, JourneyId, StopEvent};
