use error_common::{DiagnosisError, Result};
use logger_redacted::LoggerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

/// Environment prefix for overrides, e.g. `SYMPTOM_ENGINE__TRAINING__SEED=7`
pub const ENV_PREFIX: &str = "SYMPTOM_ENGINE";

/// Engine configuration
///
/// Every heuristic constant used by the vectorizer, the trainer and the
/// calibrator lives here so it can be tuned without a rebuild. The defaults
/// reproduce the documented behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EngineConfig {
    #[validate(nested)]
    pub paths: PathsConfig,
    #[validate(nested)]
    pub training: TrainingConfig,
    #[validate(nested)]
    pub weighting: WeightingConfig,
    #[validate(nested)]
    pub calibration: CalibrationConfig,
    pub logging: LoggerConfig,
}

/// Input tables and persisted artifacts
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PathsConfig {
    pub dataset: PathBuf,
    pub descriptions: PathBuf,
    pub precautions: PathBuf,
    pub knowledge_base: PathBuf,
    pub model: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("data/dataset.csv"),
            descriptions: PathBuf::from("data/symptom_Description.csv"),
            precautions: PathBuf::from("data/symptom_precaution.csv"),
            knowledge_base: PathBuf::from("data/kb_csv.json"),
            model: PathBuf::from("models/disease_model.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TrainingConfig {
    #[validate(range(min = 1, max = 5000))]
    pub n_estimators: usize,
    #[validate(range(min = 1, max = 256))]
    pub max_depth: usize,
    #[validate(range(min = 2))]
    pub min_samples_split: usize,
    #[validate(range(min = 1))]
    pub min_samples_leaf: usize,
    /// Reweight samples inversely to class frequency
    pub class_balanced: bool,
    #[validate(range(min = 0.0, max = 0.9))]
    pub test_fraction: f64,
    pub seed: u64,
    /// Records with fewer filled symptom slots are not used for training
    #[validate(range(min = 1))]
    pub min_filled_slots: usize,
    /// Number of symptom slots the position weight counts down from
    #[validate(range(min = 1))]
    pub slot_count: usize,
    #[validate(range(min = 0.0, max = 1.0))]
    pub position_step: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            max_depth: 25,
            min_samples_split: 5,
            min_samples_leaf: 2,
            class_balanced: true,
            test_fraction: 0.2,
            seed: 42,
            min_filled_slots: 2,
            slot_count: 17,
            position_step: 0.1,
        }
    }
}

impl TrainingConfig {
    /// Weight of a symptom found in the given 0-based slot.
    ///
    /// Earlier slots carry more weight. Slots past `slot_count` bottom out at 1.0.
    pub fn position_weight(&self, slot: usize) -> f64 {
        let remaining = self.slot_count.saturating_sub(slot);
        1.0 + self.position_step * remaining as f64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct WeightingConfig {
    #[validate(range(min = 0.0))]
    pub base_weight: f64,
    #[validate(range(min = 0.0))]
    pub multi_word_bonus: f64,
    #[validate(range(min = 1.0))]
    pub rarity_numerator: f64,
    #[validate(range(min = 0.0))]
    pub rarity_cap: f64,
}

impl Default for WeightingConfig {
    fn default() -> Self {
        Self {
            base_weight: 2.0,
            multi_word_bonus: 1.0,
            rarity_numerator: 5000.0,
            rarity_cap: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CalibrationConfig {
    #[validate(range(min = 0.0))]
    pub multi_symptom_step: f64,
    #[validate(range(min = 0.0))]
    pub multi_symptom_cap: f64,
    #[validate(range(min = 0.0))]
    pub weight_step: f64,
    #[validate(range(min = 0.0))]
    pub weight_cap: f64,

    /// Floor applied when three or more symptoms were detected
    #[validate(range(min = 0.0, max = 1.0))]
    pub floor_many: f64,
    /// Floor applied when exactly two symptoms were detected
    #[validate(range(min = 0.0, max = 1.0))]
    pub floor_pair: f64,
    /// Floor applied to a single detected symptom
    #[validate(range(min = 0.0, max = 1.0))]
    pub floor_single: f64,

    #[validate(range(min = 0.0))]
    pub precision_weight: f64,
    #[validate(range(min = 0.0))]
    pub coverage_weight: f64,
    #[validate(range(min = 0.0))]
    pub frequency_weight: f64,
    #[validate(range(min = 1))]
    pub coverage_cap: usize,
    #[validate(range(min = 1.0))]
    pub frequency_divisor: f64,
    #[validate(range(min = 0.0))]
    pub frequency_cap: f64,
    #[validate(range(min = 0.0))]
    pub match_cap: f64,
    #[validate(range(min = 0.0))]
    pub match_boost: f64,

    #[validate(range(min = 0.0, max = 1.0))]
    pub confidence_ceiling: f64,
    #[validate(range(min = 1, max = 100))]
    pub default_top_k: usize,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            multi_symptom_step: 0.1,
            multi_symptom_cap: 0.4,
            weight_step: 0.02,
            weight_cap: 0.3,
            floor_many: 0.02,
            floor_pair: 0.03,
            floor_single: 0.05,
            precision_weight: 0.6,
            coverage_weight: 0.3,
            frequency_weight: 0.1,
            coverage_cap: 10,
            frequency_divisor: 100.0,
            frequency_cap: 0.2,
            match_cap: 0.5,
            match_boost: 2.0,
            confidence_ceiling: 0.98,
            default_top_k: 3,
        }
    }
}

impl CalibrationConfig {
    /// Minimum adjusted probability for a candidate to be reported
    pub fn floor_for(&self, detected: usize) -> f64 {
        match detected {
            0 | 1 => self.floor_single,
            2 => self.floor_pair,
            _ => self.floor_many,
        }
    }
}

impl EngineConfig {
    /// Load from an optional YAML file, then apply `SYMPTOM_ENGINE__*` overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(DiagnosisError::Configuration(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            builder = builder.add_source(::config::File::from(path).format(::config::FileFormat::Yaml));
        }

        let settings = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| DiagnosisError::Configuration(e.to_string()))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| DiagnosisError::Configuration(e.to_string()))?;

        config.validate()?;

        tracing::debug!(
            dataset = %config.paths.dataset.display(),
            model = %config.paths.model.display(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Range checks plus the invariants that span several fields.
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(|e| DiagnosisError::Configuration(e.to_string()))?;

        let cal = &self.calibration;
        if !(cal.floor_many <= cal.floor_pair && cal.floor_pair <= cal.floor_single) {
            return Err(DiagnosisError::Configuration(
                "confidence floors must not increase with symptom count".to_string(),
            ));
        }
        if cal.confidence_ceiling <= 0.0 {
            return Err(DiagnosisError::Configuration(
                "confidence_ceiling must be in (0, 1]".to_string(),
            ));
        }
        if self.training.min_samples_split < 2 * self.training.min_samples_leaf {
            tracing::warn!(
                min_samples_split = self.training.min_samples_split,
                min_samples_leaf = self.training.min_samples_leaf,
                "⚠️ min_samples_split is below twice min_samples_leaf; some splits will never be taken"
            );
        }
        Ok(())
    }
}
