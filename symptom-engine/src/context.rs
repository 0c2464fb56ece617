//! The immutable inference context: everything a prediction request needs,
//! built once at startup and shared by reference.

use crate::calibrator::ConfidenceCalibrator;
use crate::classifier::ModelArtifact;
use crate::config::EngineConfig;
use crate::knowledge::KnowledgeBase;
use crate::mapper::{CuratedSynonyms, SymptomMapper};
use crate::vectorizer::FeatureVectorizer;
use error_common::Result;
use logger_redacted::{redactor_for, UtteranceRedactor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Description used when the knowledge base has none for a disease
pub const NO_DESCRIPTION: &str = "No description available";

const ASK_FOR_INPUT: &str = "I didn't receive any message. Could you please describe how you are feeling?";
const ASK_FOR_SYMPTOMS: &str = "I can help with symptoms, but I need more specific information. \
Could you tell me exactly what symptoms you're experiencing? For example: headache, fever, cough, nausea, etc.";
const ASK_FOR_DETAIL: &str = "I noticed some symptoms but could not match them to a likely condition with enough \
confidence. Could you describe any other symptoms, how long they have lasted and how severe they are?";

/// One ranked disease for an utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub disease: String,
    /// Calibrated, in `[base_confidence, ceiling]`
    pub confidence: f64,
    pub detected_symptoms: Vec<String>,
    pub description: String,
    /// At most four, empty rather than absent
    pub precautions: Vec<String>,
    pub symptom_match_score: f64,
    pub base_confidence: f64,
    pub total_symptom_weight: f64,
}

/// Coarse band of a calibrated confidence for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    LowModerate,
    Moderate,
    High,
    VeryHigh,
}

impl ConfidenceLevel {
    pub fn from_confidence(confidence: f64) -> Self {
        match confidence * 100.0 {
            pct if pct >= 80.0 => Self::VeryHigh,
            pct if pct >= 60.0 => Self::High,
            pct if pct >= 40.0 => Self::Moderate,
            pct if pct >= 20.0 => Self::LowModerate,
            _ => Self::Low,
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "Low",
            Self::LowModerate => "Low-Moderate",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        };
        f.write_str(label)
    }
}

impl Prediction {
    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_confidence(self.confidence)
    }
}

/// What came of one utterance.
///
/// Everything but `Ranked` yields an empty prediction list; the variants
/// let the chat layer tell the cases apart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PredictionOutcome {
    /// Empty or whitespace-only text
    EmptyInput,
    NoSymptomsDetected,
    /// Symptoms were found but every candidate fell under the confidence floor
    BelowConfidenceFloor { detected_symptoms: Vec<String> },
    Ranked { predictions: Vec<Prediction> },
}

impl PredictionOutcome {
    pub fn predictions(&self) -> &[Prediction] {
        match self {
            Self::Ranked { predictions } => predictions,
            _ => &[],
        }
    }

    pub fn into_predictions(self) -> Vec<Prediction> {
        match self {
            Self::Ranked { predictions } => predictions,
            _ => Vec::new(),
        }
    }

    /// Symptoms found in the utterance, whether or not anything was ranked
    pub fn detected_symptoms(&self) -> &[String] {
        match self {
            Self::BelowConfidenceFloor { detected_symptoms } => detected_symptoms,
            Self::Ranked { predictions } => predictions
                .first()
                .map_or(&[][..], |p| p.detected_symptoms.as_slice()),
            _ => &[],
        }
    }

    /// What to ask the user next, `None` when there are predictions to show
    pub fn follow_up_prompt(&self) -> Option<&'static str> {
        match self {
            Self::EmptyInput => Some(ASK_FOR_INPUT),
            Self::NoSymptomsDetected => Some(ASK_FOR_SYMPTOMS),
            Self::BelowConfidenceFloor { .. } => Some(ASK_FOR_DETAIL),
            Self::Ranked { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
struct DiseaseDetails {
    description: String,
    precautions: Vec<String>,
}

/// Read-only state for serving predictions.
///
/// Nothing in here changes after construction. Knowledge-base edits and new
/// models produce a new context that replaces this one through
/// [`crate::EngineHandle`].
#[derive(Debug)]
pub struct InferenceContext {
    config: EngineConfig,
    knowledge_base: KnowledgeBase,
    model: Arc<ModelArtifact>,
    mapper: SymptomMapper,
    vectorizer: FeatureVectorizer,
    calibrator: ConfidenceCalibrator,
    details: HashMap<String, DiseaseDetails>,
    redactor: UtteranceRedactor,
}

impl InferenceContext {
    pub fn new(config: EngineConfig, knowledge_base: KnowledgeBase, model: ModelArtifact) -> Result<Self> {
        Self::assemble(config, knowledge_base, Arc::new(model))
    }

    /// Load the knowledge base and model named in the configuration.
    pub fn load(config: &EngineConfig) -> Result<Self> {
        let knowledge_base = KnowledgeBase::load(&config.paths.knowledge_base)?;
        let model = ModelArtifact::load(&config.paths.model)?;
        Self::new(config.clone(), knowledge_base, model)
    }

    /// Same model and configuration over an edited knowledge base
    pub fn with_knowledge_base(&self, knowledge_base: KnowledgeBase) -> Result<Self> {
        Self::assemble(self.config.clone(), knowledge_base, Arc::clone(&self.model))
    }

    fn assemble(config: EngineConfig, knowledge_base: KnowledgeBase, model: Arc<ModelArtifact>) -> Result<Self> {
        config.validate()?;
        model.verify()?;

        let mapper = SymptomMapper::new(&knowledge_base, &CuratedSynonyms::default());
        if mapper.mapping_size() != model.metadata.mapping_size {
            tracing::debug!(
                mappings = mapper.mapping_size(),
                trained_with = model.metadata.mapping_size,
                "Mapping table differs from the one the model was trained with"
            );
        }

        let unknown = model
            .vocabulary
            .names()
            .iter()
            .filter(|name| knowledge_base.symptom(name).is_none())
            .count();
        if unknown > 0 {
            tracing::warn!(
                symptoms = unknown,
                "⚠️ Model symptoms missing from the knowledge base can only be detected through curated synonyms"
            );
        }

        let details = knowledge_base
            .diseases
            .iter()
            .map(|d| {
                let description = if d.description.trim().is_empty() {
                    NO_DESCRIPTION.to_string()
                } else {
                    d.description.clone()
                };
                (
                    d.name.clone(),
                    DiseaseDetails {
                        description,
                        precautions: d.precautions.clone(),
                    },
                )
            })
            .collect();

        let vectorizer = FeatureVectorizer::new(Arc::new(model.vocabulary.clone()), config.weighting.clone());
        let calibrator = ConfidenceCalibrator::new(config.calibration.clone());
        let redactor = redactor_for(&config.logging);

        tracing::info!(
            symptoms = knowledge_base.total_symptoms,
            diseases = model.labels.len(),
            mappings = mapper.mapping_size(),
            "🚀 Inference context ready"
        );

        Ok(Self {
            config,
            knowledge_base,
            model,
            mapper,
            vectorizer,
            calibrator,
            details,
            redactor,
        })
    }

    /// Run the full pipeline on one utterance.
    ///
    /// `top_k` defaults to the configured value.
    pub fn diagnose(&self, text: &str, top_k: Option<usize>) -> PredictionOutcome {
        let utterance = self.redactor.loggable(text);
        if text.trim().is_empty() {
            tracing::debug!(utterance = %utterance, "Empty utterance");
            return PredictionOutcome::EmptyInput;
        }

        let detected = self.mapper.extract_symptoms(text);
        if detected.is_empty() {
            tracing::info!(utterance = %utterance, "🔍 No symptoms detected");
            return PredictionOutcome::NoSymptomsDetected;
        }
        tracing::info!(utterance = %utterance, symptoms = ?detected, "🔍 Detected symptoms");

        let vector = self.vectorizer.vectorize(&detected);
        tracing::debug!(weights = ?vector.weights, total = vector.total_weight, "🎯 Symptom weights");

        let probabilities = self.model.forest.predict_proba(&vector.values);
        let top_k = top_k.unwrap_or(self.config.calibration.default_top_k);
        let ranking = self.calibrator.rank(
            &probabilities,
            &detected,
            vector.total_weight,
            top_k,
            &self.model.labels,
            &self.model.profiles,
        );

        if ranking.candidates.is_empty() {
            tracing::info!(
                utterance = %utterance,
                below_floor = ranking.below_floor,
                "No candidate above the confidence floor"
            );
            return PredictionOutcome::BelowConfidenceFloor {
                detected_symptoms: detected,
            };
        }

        let predictions: Vec<Prediction> = ranking
            .candidates
            .into_iter()
            .map(|candidate| {
                let (description, precautions) = match self.details.get(&candidate.disease) {
                    Some(details) => (details.description.clone(), details.precautions.clone()),
                    None => (NO_DESCRIPTION.to_string(), Vec::new()),
                };
                Prediction {
                    confidence: candidate.confidence,
                    detected_symptoms: detected.clone(),
                    description,
                    precautions,
                    symptom_match_score: candidate.match_score.value(),
                    base_confidence: candidate.base_confidence,
                    total_symptom_weight: vector.total_weight,
                    disease: candidate.disease,
                }
            })
            .collect();

        if let Some(top) = predictions.first() {
            tracing::info!(
                utterance = %utterance,
                disease = %top.disease,
                confidence = format!("{:.3}", top.confidence),
                candidates = predictions.len(),
                "🏥 Diagnosis ranked"
            );
        }
        PredictionOutcome::Ranked { predictions }
    }

    /// Ranked predictions, empty when nothing could be ranked
    pub fn predict(&self, text: &str, top_k: Option<usize>) -> Vec<Prediction> {
        self.diagnose(text, top_k).into_predictions()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.knowledge_base
    }

    pub fn model(&self) -> &ModelArtifact {
        &self.model
    }

    pub fn mapper(&self) -> &SymptomMapper {
        &self.mapper
    }

    pub fn vectorizer(&self) -> &FeatureVectorizer {
        &self.vectorizer
    }

    pub fn calibrator(&self) -> &ConfidenceCalibrator {
        &self.calibrator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_levels() {
        assert_eq!(ConfidenceLevel::from_confidence(0.98), ConfidenceLevel::VeryHigh);
        assert_eq!(ConfidenceLevel::from_confidence(0.6), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_confidence(0.45), ConfidenceLevel::Moderate);
        assert_eq!(ConfidenceLevel::from_confidence(0.2), ConfidenceLevel::LowModerate);
        assert_eq!(ConfidenceLevel::from_confidence(0.05), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::LowModerate.to_string(), "Low-Moderate");
    }

    #[test]
    fn test_outcomes_without_predictions() {
        let floor = PredictionOutcome::BelowConfidenceFloor {
            detected_symptoms: vec!["cough".to_string()],
        };
        assert!(floor.predictions().is_empty());
        assert_eq!(floor.detected_symptoms(), &["cough".to_string()]);

        let prompts = [
            PredictionOutcome::EmptyInput.follow_up_prompt(),
            PredictionOutcome::NoSymptomsDetected.follow_up_prompt(),
            floor.follow_up_prompt(),
        ];
        assert!(prompts.iter().all(Option::is_some));
        assert_ne!(prompts[1], prompts[2]);
        assert!(PredictionOutcome::Ranked { predictions: Vec::new() }
            .follow_up_prompt()
            .is_none());
    }
}
