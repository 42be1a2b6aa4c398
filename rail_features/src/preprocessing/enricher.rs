use crate::algorithms::engine::FeatureRow;
use crate::preprocessing::info_messages::{normalize_message, NormalizedMessage};
use crate::preprocessing::train_type::{TrainTypeClassifier, TrainTypeLabels};

/// A feature row with its message and train-type labels attached
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedStop {
    pub row: FeatureRow,
    pub message: NormalizedMessage,
    pub train_type: Option<TrainTypeLabels>,
}

/// Enricher for adding message and train-type columns to feature rows
pub struct FeatureEnricher {
    classifier: Option<TrainTypeClassifier>,
}

impl FeatureEnricher {
    /// Create a new enricher that only normalizes messages
    pub fn new() -> Self {
        Self { classifier: None }
    }

    /// Create an enricher that also classifies train types
    pub fn with_classifier(classifier: TrainTypeClassifier) -> Self {
        Self {
            classifier: Some(classifier),
        }
    }

    /// Enrich rows as produced by the feature engine
    pub fn enrich(&self, rows: Vec<FeatureRow>) -> Vec<EnrichedStop> {
        let labels: Vec<Option<TrainTypeLabels>> = match &self.classifier {
            Some(classifier) => classifier.classify_rows(&rows).into_iter().map(Some).collect(),
            None => vec![None; rows.len()],
        };

        rows.into_iter()
            .zip(labels)
            .map(|(row, train_type)| {
                let message = normalize_message(row.event.info.as_deref());
                EnrichedStop {
                    row,
                    message,
                    train_type,
                }
            })
            .collect()
    }
}

impl Default for FeatureEnricher {
    fn default() -> Self {
        Self::new()
    }
}
