//! Record-level preprocessing: journey reconstruction, coordinate resolution,
//! message and train-type enrichment, validation, and the pipeline tying
//! them together.

pub mod enricher;
pub mod geo_resolver;
pub mod info_messages;
pub mod path_expander;
pub mod pipeline;
pub mod train_type;
pub mod validator;

pub use enricher::{EnrichedStop, FeatureEnricher};
pub use geo_resolver::{CoordinateTable, GeoResolver, GeoStats, Geocoder, NoGeocoder, StaticGeocoder};
pub use info_messages::{normalize_message, NormalizedMessage};
pub use path_expander::{ExpansionStats, PathExpander, StationIndex};
pub use pipeline::{build_features, FeaturePipeline, PipelineOutput, PipelineReport};
pub use train_type::{TrainTypeClassifier, TrainTypeLabels};
pub use validator::{JourneyValidator, ValidationResult, ValidationStats};
