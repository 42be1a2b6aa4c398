//! Pipeline configuration file support.
//!
//! This module reads pipeline settings from TOML. Every section and field is
//! optional; missing values fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};
use crate::preprocessing::train_type::DEFAULT_TRAM_THRESHOLD_KM;
use crate::transformations::encoding::MESSAGE_ORDER;

/// Pipeline configuration from file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub input: InputSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub pipeline: PipelineSettings,
}

/// Input file locations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSettings {
    #[serde(default)]
    pub rides: Option<PathBuf>,
    #[serde(default)]
    pub stations: Option<PathBuf>,
    #[serde(default)]
    pub european_stations: Option<PathBuf>,
    #[serde(default)]
    pub manual_coordinates: Option<PathBuf>,
}

/// Output file locations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default)]
    pub features: Option<PathBuf>,
    #[serde(default)]
    pub report: Option<PathBuf>,
    /// Directory receiving one feature CSV per train type.
    #[serde(default)]
    pub train_type_dir: Option<PathBuf>,
}

/// Where canceled rows are removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanceledFilter {
    /// Canceled stops never reach the feature engine.
    #[default]
    BeforeFeatures,
    /// Features see canceled stops; the rows are removed from the output.
    AfterFeatures,
    /// Canceled stops stay in the output, flagged in the `canceled` column.
    Keep,
}

/// Treatment of missing delay values before feature computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayImputation {
    #[default]
    Keep,
    Zero,
}

/// Processing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSettings {
    #[serde(default = "default_expand_paths")]
    pub expand_paths: bool,
    #[serde(default = "default_country_filter")]
    pub country_filter: String,
    #[serde(default = "default_tram_threshold_km")]
    pub tram_threshold_km: f64,
    #[serde(default)]
    pub canceled_filter: CanceledFilter,
    #[serde(default)]
    pub delay_imputation: DelayImputation,
    #[serde(default = "default_classify_train_types")]
    pub classify_train_types: bool,
    #[serde(default)]
    pub drop_columns: Vec<String>,
    #[serde(default = "default_message_order")]
    pub message_order: Vec<String>,
}

fn default_expand_paths() -> bool {
    true
}

fn default_country_filter() -> String {
    "DE".to_string()
}

fn default_tram_threshold_km() -> f64 {
    DEFAULT_TRAM_THRESHOLD_KM
}

fn default_classify_train_types() -> bool {
    true
}

fn default_message_order() -> Vec<String> {
    MESSAGE_ORDER.iter().map(|s| s.to_string()).collect()
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            expand_paths: default_expand_paths(),
            country_filter: default_country_filter(),
            tram_threshold_km: default_tram_threshold_km(),
            canceled_filter: CanceledFilter::default(),
            delay_imputation: DelayImputation::default(),
            classify_train_types: default_classify_train_types(),
            drop_columns: Vec::new(),
            message_order: default_message_order(),
        }
    }
}

impl PipelineConfig {
    /// Load pipeline configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(PipelineConfig)` if successful
    /// * `Err(PipelineError::Config)` if the file cannot be read, parsed or is inconsistent
    pub fn from_file<P: AsRef<Path>>(path: P) -> PipelineResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            PipelineError::Config(format!("Failed to read config file: {}", e))
        })?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> PipelineResult<Self> {
        let config: PipelineConfig = toml::from_str(content).map_err(|e| {
            PipelineError::Config(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load pipeline configuration from the default location.
    ///
    /// Searches for `rail_features.toml` in:
    /// 1. Current directory
    /// 2. `rail_features/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> PipelineResult<Self> {
        let search_paths = [
            PathBuf::from("rail_features.toml"),
            PathBuf::from("rail_features/rail_features.toml"),
            PathBuf::from("../rail_features.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(PipelineError::Config(
            "No rail_features.toml found in standard locations".to_string(),
        ))
    }

    pub fn validate(&self) -> PipelineResult<()> {
        let settings = &self.pipeline;
        if !(settings.tram_threshold_km.is_finite() && settings.tram_threshold_km > 0.0) {
            return Err(PipelineError::Config(format!(
                "tram_threshold_km must be positive, got {}",
                settings.tram_threshold_km
            )));
        }
        if settings.country_filter.trim().is_empty() {
            return Err(PipelineError::Config(
                "country_filter must not be empty".to_string(),
            ));
        }
        if settings.message_order.is_empty() {
            return Err(PipelineError::Config(
                "message_order must list at least one category".to_string(),
            ));
        }
        for (i, category) in settings.message_order.iter().enumerate() {
            if settings.message_order[..i].contains(category) {
                return Err(PipelineError::Config(format!(
                    "message_order lists '{}' twice",
                    category
                )));
            }
        }
        Ok(())
    }
}
