//! Train-type classification from line names and stop spacing.
//!
//! Two signals are combined per journey: the alphabetic prefix of the line
//! name and the mean distance between consecutive stops. Closely spaced
//! stops indicate a tram; the distance class takes precedence whenever it can
//! be computed.

use serde::Serialize;

use crate::algorithms::engine::FeatureRow;
use crate::core::domain::JourneyId;

/// Mean stop spacing at or below which a journey counts as a tram.
pub const DEFAULT_TRAM_THRESHOLD_KM: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LinePrefixCategory {
    ReRb,
    NoPrefix,
    Other,
}

impl LinePrefixCategory {
    /// Categorizes a line name by all of its alphabetic characters.
    ///
    /// # Examples
    ///
    /// ```
    /// use rail_features::preprocessing::train_type::LinePrefixCategory;
    ///
    /// assert_eq!(LinePrefixCategory::from_line(Some("RE 5")), LinePrefixCategory::ReRb);
    /// assert_eq!(LinePrefixCategory::from_line(Some("S 12")), LinePrefixCategory::Other);
    /// assert_eq!(LinePrefixCategory::from_line(Some("12")), LinePrefixCategory::NoPrefix);
    /// assert_eq!(LinePrefixCategory::from_line(None), LinePrefixCategory::NoPrefix);
    /// ```
    pub fn from_line(line: Option<&str>) -> Self {
        let prefix: String = line
            .unwrap_or_default()
            .chars()
            .filter(|c| c.is_alphabetic())
            .collect();
        match prefix.as_str() {
            "" => Self::NoPrefix,
            "RE" | "RB" => Self::ReRb,
            _ => Self::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ReRb => "RE/RB Prefix",
            Self::NoPrefix => "No Prefix",
            Self::Other => "Other Prefix",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TrainClass {
    Tram,
    RegionalTrain,
}

impl TrainClass {
    pub fn from_average_distance(avg_km: f64, threshold_km: f64) -> Self {
        if avg_km <= threshold_km {
            Self::Tram
        } else {
            Self::RegionalTrain
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Tram => "Tram",
            Self::RegionalTrain => "Regional Train",
        }
    }
}

/// Labels attached to every stop of a journey.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrainTypeLabels {
    pub line_category: LinePrefixCategory,
    pub avg_distance_between_stops: Option<f64>,
    pub train_class: Option<TrainClass>,
}

impl TrainTypeLabels {
    /// Distance class when known, prefix category otherwise.
    pub fn final_label(&self) -> &'static str {
        match self.train_class {
            Some(class) => class.label(),
            None => self.line_category.label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JourneyClassification {
    pub journey: JourneyId,
    pub stops: usize,
    pub labels: TrainTypeLabels,
}

#[derive(Debug, Clone, Copy)]
pub struct TrainTypeClassifier {
    threshold_km: f64,
}

impl TrainTypeClassifier {
    pub fn new(threshold_km: f64) -> Self {
        Self { threshold_km }
    }

    /// Classifies each journey of a feature table.
    ///
    /// Rows must come grouped by journey, as produced by the feature engine.
    pub fn classify_journeys(&self, rows: &[FeatureRow]) -> Vec<JourneyClassification> {
        rows.chunk_by(|a, b| a.event.journey == b.event.journey)
            .map(|journey| {
                let distances: Vec<f64> = journey
                    .iter()
                    .map(|r| r.features.distance.distance_to_next_stop)
                    .collect();
                let avg = mean(&distances);
                let line = journey.iter().find_map(|r| r.event.line.as_deref());
                JourneyClassification {
                    journey: journey[0].event.journey.clone(),
                    stops: journey.len(),
                    labels: TrainTypeLabels {
                        line_category: LinePrefixCategory::from_line(line),
                        avg_distance_between_stops: avg,
                        train_class: avg
                            .map(|d| TrainClass::from_average_distance(d, self.threshold_km)),
                    },
                }
            })
            .collect()
    }

    /// Labels per row, in row order.
    pub fn classify_rows(&self, rows: &[FeatureRow]) -> Vec<TrainTypeLabels> {
        self.classify_journeys(rows)
            .into_iter()
            .flat_map(|c| std::iter::repeat(c.labels).take(c.stops))
            .collect()
    }
}

impl Default for TrainTypeClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_TRAM_THRESHOLD_KM)
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    avg.is_finite().then_some(avg)
}
