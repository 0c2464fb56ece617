//! Symptom-to-disease inference for a conversational health assistant.
//!
//! The pipeline turns a free-text utterance into a ranked, explainable list
//! of likely conditions:
//!
//! 1. [`SymptomMapper`] finds canonical symptom identifiers in the text.
//! 2. [`FeatureVectorizer`] weights them by specificity and rarity.
//! 3. [`RandomForest`] produces class probabilities.
//! 4. [`ConfidenceCalibrator`] boosts, filters and ranks the candidates.
//!
//! Offline, [`KnowledgeBaseBuilder`] and [`Trainer`] derive the knowledge base
//! and the model from the same [`SymptomDataset`] through one shared
//! [`SymptomVocabulary`]. At runtime both artifacts are loaded into an
//! immutable [`InferenceContext`], optionally behind an [`EngineHandle`] for
//! copy-on-write updates.
//!
//! # Example
//!
//! ```rust,no_run
//! use symptom_engine::{EngineConfig, InferenceContext};
//!
//! # fn main() -> symptom_engine::Result<()> {
//! let config = EngineConfig::load(None)?;
//! let context = InferenceContext::load(&config)?;
//!
//! let outcome = context.diagnose("I have a headache and feel very tired with high fever", None);
//! for prediction in outcome.predictions() {
//!     println!("{}: {:.1}%", prediction.disease, prediction.confidence * 100.0);
//! }
//! if let Some(prompt) = outcome.follow_up_prompt() {
//!     println!("{prompt}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod calibrator;
pub mod classifier;
pub mod config;
pub mod context;
pub mod dataset;
pub mod handle;
pub mod knowledge;
pub mod mapper;
pub mod persistence;
pub mod vectorizer;
pub mod vocabulary;

pub use calibrator::{ConfidenceCalibrator, MatchScore, RankedDisease, Ranking};
pub use classifier::{LabelEncoder, ModelArtifact, ModelMetadata, RandomForest, Trainer, TrainingReport};
pub use config::{CalibrationConfig, EngineConfig, PathsConfig, TrainingConfig, WeightingConfig};
pub use context::{ConfidenceLevel, InferenceContext, Prediction, PredictionOutcome};
pub use dataset::{CaseRecord, DiseaseCatalog, SymptomDataset};
pub use handle::EngineHandle;
pub use knowledge::editor::{NewDisease, NewSymptom};
pub use knowledge::{DiseaseRecord, KnowledgeBase, KnowledgeBaseBuilder, KnowledgeBaseStats, SymptomCategory, SymptomRecord};
pub use mapper::{CuratedSynonyms, SymptomMapper};
pub use vectorizer::{FeatureVector, FeatureVectorizer};
pub use vocabulary::{DiseaseProfile, DiseaseProfiles, SymptomVocabulary};

pub use error_common::{DiagnosisError, Result};
